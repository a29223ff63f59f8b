pub mod console;
pub mod content;
pub mod dialogs;
pub mod input;
pub mod instance_list;
pub mod status_bar;

pub use console::ConsoleFocus;
pub use dialogs::CreateForm;
pub use input::Input;
pub use instance_list::InstanceList;
pub use status_bar::{Notice, StatusBar};
