pub mod set_highlighter;
