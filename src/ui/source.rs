use iced::widget::{container, mouse_area, text, Image};
use iced::{mouse, Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::data::ImageRef;
use crate::state::drag::DragState;
use crate::state::images::{Fidelity, ImageStatus, ImageStore};
use crate::Message;

/// Width of a source image in the tray
const SOURCE_WIDTH: f32 = 100.0;

/// Opacity of the source image being dragged
const DRAGGING_OPACITY: f32 = 0.5;

/// Tray of draggable source images
pub fn tray<'a>(
    sources: &'a [ImageRef],
    images: &'a ImageStore,
    drag: &DragState,
) -> Element<'a, Message> {
    let items: Vec<Element<'a, Message>> = sources
        .iter()
        .enumerate()
        .map(|(slot, reference)| source_image(slot, reference, images, drag.is_dragging(slot)))
        .collect();

    Wrap::with_elements(items)
        .spacing(10.0)
        .line_spacing(10.0)
        .into()
}

/// One source image; pressing it starts a drag gesture
fn source_image<'a>(
    slot: usize,
    reference: &'a ImageRef,
    images: &'a ImageStore,
    dragging: bool,
) -> Element<'a, Message> {
    let opacity = if dragging { DRAGGING_OPACITY } else { 1.0 };

    let content: Element<'a, Message> = match images.status(reference, Fidelity::Thumbnail) {
        Some(ImageStatus::Loaded(image)) => Image::new(image.handle().clone())
            .width(Length::Fixed(SOURCE_WIDTH))
            .opacity(opacity)
            .into(),
        Some(ImageStatus::Failed(reason)) => placeholder(reason),
        _ => placeholder("Loading…"),
    };

    mouse_area(content)
        .on_press(Message::DragStarted(slot))
        .interaction(mouse::Interaction::Grab)
        .into()
}

fn placeholder<'a>(label: &'a str) -> Element<'a, Message> {
    container(text(label).size(12))
        .width(Length::Fixed(SOURCE_WIDTH))
        .height(Length::Fixed(SOURCE_WIDTH))
        .align_x(Alignment::Center)
        .align_y(Alignment::Center)
        .into()
}
