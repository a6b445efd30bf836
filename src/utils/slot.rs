use rand::Rng;
use uuid::Uuid;

/// Produces the human-readable slot label stamped on a ticket at intake.
/// Pluggable so a deterministic or collision-checked allocator can replace
/// the randomized one without touching the intake path.
pub trait SlotAllocator: Send + Sync {
    fn allocate(&self, parking_spot_id: Uuid) -> String;
}

/// Picks a random slot label of the form `Level {1|2} - {A-F}{01-10}`.
pub struct RandomSlotAllocator;

impl SlotAllocator for RandomSlotAllocator {
    fn allocate(&self, _parking_spot_id: Uuid) -> String {
        let mut rng = rand::thread_rng();
        let level = rng.gen_range(1..=2);
        let section = (b'A' + rng.gen_range(0..6)) as char;
        let number = rng.gen_range(1..=10);
        format!("Level {} - {}{:02}", level, section, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_label(label: &str) -> (u32, char, u32) {
        let rest = label.strip_prefix("Level ").unwrap();
        let (level, rest) = rest.split_once(" - ").unwrap();
        let mut chars = rest.chars();
        let section = chars.next().unwrap();
        let number: u32 = chars.as_str().parse().unwrap();
        (level.parse().unwrap(), section, number)
    }

    #[test]
    fn test_random_labels_stay_in_range() {
        let allocator = RandomSlotAllocator;
        for _ in 0..200 {
            let label = allocator.allocate(Uuid::new_v4());
            let (level, section, number) = parse_label(&label);
            assert!(level == 1 || level == 2, "bad level in {}", label);
            assert!(('A'..='F').contains(&section), "bad section in {}", label);
            assert!((1..=10).contains(&number), "bad number in {}", label);
        }
    }

    #[test]
    fn test_spot_number_is_zero_padded() {
        let allocator = RandomSlotAllocator;
        for _ in 0..50 {
            let label = allocator.allocate(Uuid::new_v4());
            let digits = label.rsplit_once(' ').unwrap().1;
            // "A01" .. "F10": always one letter and two digits
            assert_eq!(digits.len(), 3, "unexpected label {}", label);
        }
    }

    struct FixedAllocator(&'static str);

    impl SlotAllocator for FixedAllocator {
        fn allocate(&self, _parking_spot_id: Uuid) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_allocator_is_pluggable() {
        let allocator: Box<dyn SlotAllocator> = Box::new(FixedAllocator("Level 1 - A01"));
        assert_eq!(allocator.allocate(Uuid::new_v4()), "Level 1 - A01");
    }
}
