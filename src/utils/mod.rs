pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::get_cursor_user_dir;
pub use paths::{
    CanonicalPath, PathError, decode_file_uri, format_path_with_tilde, is_contained,
    normalize_path, relative_of,
};
pub use terminal::strip_ansi_codes;
