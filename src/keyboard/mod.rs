pub mod layout;

pub use layout::KeyboardLayout;
