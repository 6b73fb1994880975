mod info;
mod list;

pub use info::cmd_show_info;
pub use list::cmd_list_shows;
