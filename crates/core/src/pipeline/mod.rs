pub mod infrastructure;
pub mod locate_forehead_use_case;
