mod similarity;
mod slug;

pub use similarity::{jaccard, title_tokens};
pub use slug::{clean_title, norm_spaces, slug};
