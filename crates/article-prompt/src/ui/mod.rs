pub mod menu;
pub mod presenter;
pub mod theme;

pub use menu::PromptMenu;
pub use presenter::{present_result, ConsolePresenter, Presenter};
pub use theme::SpinnerKind;
