pub mod text_area;
pub mod text_input;

pub use text_area::TextAreaState;
pub use text_input::TextInputState;
