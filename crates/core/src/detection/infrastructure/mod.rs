pub mod adaptive_threshold;
pub mod contour_card_detector;
pub mod contour_forest;
pub mod contour_sampler;
pub mod math;
pub mod shape_classifier;
