pub mod extractor;
pub mod normalizer;
pub mod title_tail;

pub use extractor::{extract_from_page, PAGE_STRATEGIES};
pub use normalizer::{normalize, precision, Precision};
pub use title_tail::{is_suspicious, location_from_title, TitleTailRules};
