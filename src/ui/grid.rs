use iced::widget::{container, mouse_area, Column, Image, Row, Space, Stack};
use iced::{Border, Color, ContentFit, Element, Length};

use crate::layout::{self, FRAME_BORDER, GRID_BORDER, GRID_BORDER_RGB, GRID_HEIGHT, GRID_WIDTH, ROWS};
use crate::state::data::{FrameIndex, ImageRef};
use crate::state::drag::{DragState, FrameTint};
use crate::state::grid::GridAssignment;
use crate::state::images::ImageStore;
use crate::Message;

/// The 3x2 grid of drop frames
pub fn photo_grid<'a>(
    grid: &'a GridAssignment,
    images: &'a ImageStore,
    drag: &DragState,
) -> Element<'a, Message> {
    let rows = (0..ROWS).map(|row| -> Element<'a, Message> {
        let frames = FrameIndex::all()
            .filter(|frame| frame.row() == row)
            .map(|frame| drop_frame(frame, grid.get(frame), images, drag.frame_tint(frame)));
        Row::with_children(frames).into()
    });

    let [r, g, b] = GRID_BORDER_RGB;
    let border = 2.0 * GRID_BORDER as f32;

    container(Column::with_children(rows))
        .width(Length::Fixed(GRID_WIDTH as f32 + border))
        .height(Length::Fixed(GRID_HEIGHT as f32 + border))
        .padding(GRID_BORDER as u16)
        .style(move |_theme| container::Style {
            border: Border {
                color: Color::from_rgb8(r, g, b),
                width: GRID_BORDER as f32,
                radius: 0.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}

/// A single drop frame: tinted background with the assigned image on top
fn drop_frame<'a>(
    frame: FrameIndex,
    reference: Option<&'a ImageRef>,
    images: &'a ImageStore,
    tint: FrameTint,
) -> Element<'a, Message> {
    let (width, height) = layout::frame_size();
    let [r, g, b] = tint.rgb();
    let background = Color::from_rgb8(r, g, b);

    let mut layers = Stack::new().push(
        container(Space::new(Length::Fill, Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_theme| container::Style {
                background: Some(background.into()),
                ..container::Style::default()
            }),
    );

    if let Some(image) = reference.and_then(|r| images.display(r)) {
        layers = layers.push(
            Image::new(image.handle().clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Cover),
        );
    }

    let framed = container(layers)
        .width(Length::Fixed(width))
        .height(Length::Fixed(height))
        .padding(FRAME_BORDER as u16)
        .clip(true)
        .style(|_theme| container::Style {
            border: Border {
                color: Color::BLACK,
                width: FRAME_BORDER as f32,
                radius: 0.0.into(),
            },
            ..container::Style::default()
        });

    mouse_area(framed)
        .on_enter(Message::FrameEntered(frame))
        .on_exit(Message::FrameExited(frame))
        .into()
}
