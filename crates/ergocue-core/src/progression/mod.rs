mod badges;
mod engine;

pub use badges::{all_badges, find_badge, Badge, BadgeCategory, NEGATIVE_BADGES, POSITIVE_BADGES};
pub use engine::{BadgeMetric, ProgressionConfig, ProgressionEngine, UserProgress};
