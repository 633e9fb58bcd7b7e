//! Studyboard Render Library
//!
//! Turns a [`studyboard_core::Whiteboard`] into a layered [`Frame`] and hands
//! it to a [`Renderer`] backend. The GPU backend uses Vello and is enabled
//! with the `vello-renderer` feature.

mod frame;
mod pipeline;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use frame::{
    DrawCommand, Frame, Layer, LayerKind, TextStyle, erase_blend, highlight_blend, normal_blend,
};
pub use renderer::{
    GridStyle, RecordingRenderer, RenderContext, RenderResult, Renderer, RendererError,
};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
