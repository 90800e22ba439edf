/// Asserts the registry's combined and category views agree.
#[macro_export]
macro_rules! assert_consistent {
    ($scene:expr) => {
        if let Err(e) = $scene.registry().verify() {
            panic!("registry inconsistent at tick {}: {}", $scene.tick_count(), e);
        }
    };
}

/// Asserts the entity with the given ID is no longer registered.
#[macro_export]
macro_rules! assert_entity_gone {
    ($scene:expr, $id:expr) => {
        assert!(
            !$scene.registry().contains($id),
            "Entity {} should be gone but is still registered",
            $id
        );
    };
}

/// Asserts the queen's roster has exactly `$count` workers.
#[macro_export]
macro_rules! assert_roster {
    ($scene:expr, $queen:expr, $count:expr) => {
        let queen = $scene
            .registry()
            .queen($queen)
            .expect("Queen not found in scene");
        assert_eq!(queen.worker_count(), $count, "Roster size mismatch");
    };
}
