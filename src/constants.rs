//! Constants used throughout viewrender

/// Template file extension, without the leading dot
pub const TEMPLATE_EXTENSION: &str = "j2";

/// File stem used when a template identifier names a directory
pub const INDEX_STEM: &str = "index";

/// Content type set on a request context by side-effecting renders
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Template name used for inline (`fromString`) sources
pub const INLINE_TEMPLATE_NAME: &str = "<string>";

/// STDIN indicator for CLI arguments
pub const STDIN_INDICATOR: &str = "-";

/// Keys a helper data file may use to name itself explicitly
pub mod helper_meta {
    pub const NAME: &str = "moduleName";
    pub const BODY: &str = "moduleBody";
}

/// Keys recognised in a configuration object
pub mod config_keys {
    pub const VIEW_PATH: &str = "viewPath";
    pub const LOCALS: &str = "locals";
    pub const NO_CACHE: &str = "noCache";
    pub const HELPER_PATH: &str = "helperPath";
    pub const DEBUG: &str = "debug";
    pub const PRETTY: &str = "pretty";
    pub const COMPILE_DEBUG: &str = "compileDebug";
    pub const AUTOESCAPE: &str = "autoescape";
    pub const STRICT: &str = "strict";
    pub const BASEDIR: &str = "basedir";
    pub const FROM_STRING: &str = "fromString";
    pub const RETURN_STRING: &str = "returnString";
    /// Host application; accepted but unused, see `ViewEngine::install`
    pub const APP: &str = "app";

    /// Boolean compile options copied one by one when `debug` is absent
    pub const BOOLEAN_COMPILE_OPTIONS: &[&str] = &[PRETTY, COMPILE_DEBUG, AUTOESCAPE, STRICT];
}

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
