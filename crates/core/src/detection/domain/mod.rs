pub mod card;
pub mod card_detector;
pub mod set_rules;
