mod interaction;
mod view;

pub(super) use view::EguiCanvas;
