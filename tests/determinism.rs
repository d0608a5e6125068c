mod common;

use common::FlockBuilder;

#[test]
fn test_determinism_consistency() {
    let build = || {
        FlockBuilder::new()
            .with_seed(12345)
            .with_config(|c| c.flock.agent_count = 300)
            .build()
    };
    let mut flock1 = build();
    let mut flock2 = build();

    assert_eq!(flock1.positions(), flock2.positions());
    assert_eq!(flock1.velocities(), flock2.velocities());

    for _ in 0..100 {
        flock1.step(1.0 / 60.0).unwrap();
        flock2.step(1.0 / 60.0).unwrap();
    }

    for i in 0..flock1.len() {
        assert_eq!(
            flock1.positions()[i],
            flock2.positions()[i],
            "Agent position should match at index {}",
            i
        );
        assert_eq!(
            flock1.velocities()[i],
            flock2.velocities()[i],
            "Agent velocity should match at index {}",
            i
        );
    }
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = FlockBuilder::new()
        .with_seed(1)
        .with_config(|c| c.flock.agent_count = 20)
        .build();
    let mut b = FlockBuilder::new()
        .with_seed(2)
        .with_config(|c| c.flock.agent_count = 20)
        .build();
    a.step(0.01).unwrap();
    b.step(0.01).unwrap();
    assert_ne!(a.positions(), b.positions());
}

#[test]
fn test_resize_is_seeded() {
    let build = || {
        let mut flock = FlockBuilder::new()
            .with_seed(9)
            .with_config(|c| c.flock.agent_count = 10)
            .build();
        flock.resize(4);
        flock.resize(30);
        flock
    };
    assert_eq!(build().positions(), build().positions());
}
