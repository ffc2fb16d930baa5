pub mod outline_highlighter;
