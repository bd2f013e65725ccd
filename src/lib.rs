pub mod backend;
pub mod bridge;
pub mod catalog;
pub mod config;
pub mod frame;
pub mod loader;
pub mod markdown;
pub mod msg;
pub mod nav;
pub mod runtime;
pub mod task;
pub mod term;
pub mod theme;
pub mod view;

pub mod components {
    pub mod chart;
    pub mod form;
    pub mod input;
    pub mod paths;
    pub mod statusbar;
    pub mod viewport;
    pub use form::Form;
    pub use input::Input;
    pub use statusbar::Statusbar;
    pub use viewport::Viewport;
}

pub mod screens {
    pub mod cost;
    pub mod form;
    pub mod help;
    pub mod launcher;
    pub mod sessions;
    pub mod viewer;
}
