//! UI Components
//!
//! Leptos components; each one calls into the sync layer through `AppContext`.

mod chat_widget;
mod delete_confirm_button;
mod new_task_form;
mod task_list;
mod task_row;

pub use chat_widget::ChatWidget;
pub use delete_confirm_button::DeleteConfirmButton;
pub use new_task_form::NewTaskForm;
pub use task_list::TaskList;
pub use task_row::TaskRow;
