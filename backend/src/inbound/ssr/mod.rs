//! Server-side rendered document shell.
//!
//! Browser navigations are answered with a streamed HTML document: the head
//! and root container first, then the page content, then the initial state
//! and the client bundle's bootstrap scripts. The client bundle is described
//! by a [`ChunkManifest`] read from the build's stats file.

mod document;
mod manifest;
mod pages;
mod render;

pub use document::{
    DocumentVariables, INITIAL_DATA_ID, LANG_COOKIE, Language, ROOT_ID, SHELL_END, shell_scripts,
    shell_start,
};
pub use manifest::{
    AUTO_PUBLIC_PATH, Asset, AssetKind, ChunkManifest, FALLBACK_BUNDLE, ManifestError,
};
pub use pages::Page;
pub use render::{HTML_CONTENT_TYPE, SsrState, render_page};
