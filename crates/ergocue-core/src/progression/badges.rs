//! Static badge tables.
//!
//! Positive badges track the completion streak, negative ("comedic") badges
//! track the dismissal streak. Both tables are ordered by ascending threshold.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Positive,
    Negative,
}

/// A named achievement unlocked once a streak metric reaches `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub name: &'static str,
    pub threshold: u32,
    pub category: BadgeCategory,
}

impl Badge {
    const fn positive(name: &'static str, threshold: u32) -> Self {
        Self {
            name,
            threshold,
            category: BadgeCategory::Positive,
        }
    }

    const fn negative(name: &'static str, threshold: u32) -> Self {
        Self {
            name,
            threshold,
            category: BadgeCategory::Negative,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.category == BadgeCategory::Negative
    }
}

pub const POSITIVE_BADGES: &[Badge] = &[
    Badge::positive("First Step", 1),
    Badge::positive("Baby Steps", 2),
    Badge::positive("Getting Going", 3),
    Badge::positive("Early Bird", 5),
    Badge::positive("Starter", 7),
    Badge::positive("Beginner", 10),
    Badge::positive("Novice", 15),
    Badge::positive("Learner", 20),
    Badge::positive("Apprentice", 25),
    Badge::positive("Student", 30),
    Badge::positive("Trainee", 35),
    Badge::positive("Freshman", 40),
    Badge::positive("Rookie", 45),
    Badge::positive("Newbie", 50),
    Badge::positive("Initiate", 60),
    Badge::positive("Explorer", 70),
    Badge::positive("Adventurer", 80),
    Badge::positive("Discoverer", 90),
    Badge::positive("Pioneer", 100),
    Badge::positive("Trailblazer", 110),
    Badge::positive("Go-Getter", 125),
    Badge::positive("Achiever", 140),
    Badge::positive("Striver", 155),
    Badge::positive("Worker", 170),
    Badge::positive("Grinder", 185),
    Badge::positive("Hustler", 200),
    Badge::positive("Climber", 220),
    Badge::positive("Progressor", 240),
    Badge::positive("Developer", 260),
    Badge::positive("Builder", 280),
    Badge::positive("Creator", 300),
    Badge::positive("Maker", 325),
    Badge::positive("Shaper", 350),
    Badge::positive("Former", 375),
    Badge::positive("Establisher", 400),
    Badge::positive("Founder", 425),
    Badge::positive("Settler", 450),
    Badge::positive("Organizer", 475),
    Badge::positive("Planner", 500),
    Badge::positive("Strategist", 530),
    Badge::positive("Tactician", 560),
    Badge::positive("Coordinator", 590),
    Badge::positive("Director", 620),
    Badge::positive("Manager", 650),
    Badge::positive("Leader", 680),
    Badge::positive("Commander", 710),
    Badge::positive("Chief", 740),
    Badge::positive("Captain", 770),
    Badge::positive("Major", 800),
    Badge::positive("Colonel", 835),
    Badge::positive("General", 870),
    Badge::positive("Marshal", 905),
    Badge::positive("Warden", 940),
    Badge::positive("Guardian", 975),
    Badge::positive("Protector", 1010),
    Badge::positive("Defender", 1050),
    Badge::positive("Champion", 1090),
    Badge::positive("Hero", 1130),
    Badge::positive("Warrior", 1170),
    Badge::positive("Fighter", 1210),
    Badge::positive("Gladiator", 1260),
    Badge::positive("Samurai", 1310),
    Badge::positive("Ninja", 1360),
    Badge::positive("Monk", 1410),
    Badge::positive("Sensei", 1460),
    Badge::positive("Master", 1520),
    Badge::positive("Expert", 1580),
    Badge::positive("Specialist", 1640),
    Badge::positive("Professional", 1700),
    Badge::positive("Authority", 1770),
    Badge::positive("Virtuoso", 1840),
    Badge::positive("Ace", 1910),
    Badge::positive("Star", 1980),
    Badge::positive("Icon", 2050),
    Badge::positive("Celebrity", 2130),
    Badge::positive("Superstar", 2210),
    Badge::positive("Phenomenon", 2290),
    Badge::positive("Prodigy", 2370),
    Badge::positive("Genius", 2450),
    Badge::positive("Mastermind", 2540),
    Badge::positive("Sage", 2630),
    Badge::positive("Wizard", 2720),
    Badge::positive("Sorcerer", 2810),
    Badge::positive("Magician", 2900),
    Badge::positive("Enchanter", 3000),
    Badge::positive("Oracle", 3120),
    Badge::positive("Prophet", 3240),
    Badge::positive("Mystic", 3360),
    Badge::positive("Titan", 3500),
    Badge::positive("Colossus", 3650),
    Badge::positive("Behemoth", 3800),
    Badge::positive("Leviathan", 3950),
    Badge::positive("Immortal", 4120),
    Badge::positive("Eternal", 4290),
    Badge::positive("Infinite", 4460),
    Badge::positive("Cosmic", 4650),
    Badge::positive("Celestial", 4840),
    Badge::positive("Divine", 5030),
    Badge::positive("Transcendent", 5250),
    Badge::positive("Legendary", 10000),
];

pub const NEGATIVE_BADGES: &[Badge] = &[
    Badge::negative("Rebel 😏", 3),
    Badge::negative("Procrastinator 🙄", 5),
    Badge::negative("Dismissive 😒", 10),
    Badge::negative("Too Busy? 🤔", 15),
    Badge::negative("Health Denier 😤", 20),
    Badge::negative("Couch Commander 🛋️", 25),
    Badge::negative("Button Masher 🖱️", 30),
    Badge::negative("Chronic Clicker 💢", 40),
    Badge::negative("Ergonomic Anarchist 🏴", 50),
    Badge::negative("Professional Ignorer 🙈", 75),
    Badge::negative("Master Avoider 🏃", 100),
    Badge::negative("Stubborn Sitter 🪑", 150),
    Badge::negative("Back Pain Collector 💀", 200),
];

/// Every badge, positive first.
pub fn all_badges() -> impl Iterator<Item = &'static Badge> {
    POSITIVE_BADGES.iter().chain(NEGATIVE_BADGES.iter())
}

pub fn find_badge(name: &str) -> Option<&'static Badge> {
    all_badges().find(|b| b.name == name)
}
