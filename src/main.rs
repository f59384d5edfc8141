use std::path::PathBuf;

use iced::widget::{button, column, container, row, text};
use iced::{event, mouse, touch, window};
use iced::{Alignment, Border, Color, Element, Event, Length, Subscription, Task, Theme};
use rfd::FileDialog;

mod config;
mod export;
mod layout;
mod media;
mod state;
mod ui;

use config::AppConfig;
use export::{DownloadsFolder, ExportError, ExportProgress, PendingExport, PngRasterizer, Scene};
use media::import::{self, ImportResult};
use media::loader::{LoadError, Loader};
use state::data::{DragPayload, FrameIndex, ImageRef, FRAME_COUNT};
use state::drag::DragState;
use state::grid::GridAssignment;
use state::images::{Fidelity, ImageStore, LoadedImage};

/// Main application state
struct StoryGrid {
    config: AppConfig,
    /// References offered in the source tray
    sources: Vec<ImageRef>,
    /// Which image each frame shows
    grid: GridAssignment,
    images: ImageStore,
    loader: Loader,
    drag: DragState,
    /// Export waiting for images to finish loading
    export: Option<PendingExport>,
    /// Status message to display to the user
    status: String,
    /// Exports handed to the rasterizer this session
    exports_started: usize,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Pointer pressed on the source image at this tray slot
    DragStarted(usize),
    /// Pointer entered a drop frame
    FrameEntered(FrameIndex),
    /// Pointer left a drop frame
    FrameExited(FrameIndex),
    /// Left button released anywhere in the window
    PointerReleased,
    /// Background load finished
    ImageLoaded(ImageRef, Fidelity, Result<LoadedImage, LoadError>),
    /// User clicked "Download as Image"
    DownloadPressed,
    /// Background rasterize + save finished
    ExportFinished(Result<PathBuf, ExportError>),
    /// User clicked "Add Folder"
    AddFolder,
    /// Background folder scan finished
    ImportComplete(ImportResult),
}

impl StoryGrid {
    fn new() -> (Self, Task<Message>) {
        let loader = Loader::new().unwrap_or_else(|e| {
            log::error!("Remote images disabled: {}", e);
            Loader::offline()
        });

        let mut app = Self::with_config(AppConfig::load_or_default(), loader);
        let loads = app.request_loads(app.sources.clone(), Fidelity::Thumbnail);
        log::info!("🎨 Story Grid initialized with {} source images", app.sources.len());

        (app, loads)
    }

    fn with_config(config: AppConfig, loader: Loader) -> Self {
        let sources = config.source_refs();

        StoryGrid {
            config,
            sources,
            grid: GridAssignment::new(),
            images: ImageStore::new(),
            loader,
            drag: DragState::default(),
            export: None,
            status: "Drag photos into the grid.".to_string(),
            exports_started: 0,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::DragStarted(slot) => {
                if let Some(reference) = self.sources.get(slot) {
                    self.drag.begin(slot, DragPayload::Image(reference.clone()));
                }
                Task::none()
            }
            Message::FrameEntered(frame) => {
                self.drag.enter(frame);
                Task::none()
            }
            Message::FrameExited(frame) => {
                self.drag.leave(frame);
                Task::none()
            }
            Message::PointerReleased => {
                let Some(dropped) = self.drag.release() else {
                    return Task::none();
                };

                log::debug!("Dropped {} on frame {}", dropped.reference, dropped.frame.get());
                self.grid = self.grid.assign(dropped.frame, dropped.reference.clone());
                self.images.evict_unused(&self.grid);
                self.request_loads([dropped.reference], Fidelity::Full)
            }
            Message::ImageLoaded(reference, fidelity, result) => {
                self.image_loaded(reference, fidelity, result)
            }
            Message::DownloadPressed => self.start_export(),
            Message::ExportFinished(result) => {
                match result {
                    Ok(path) => {
                        self.status = format!("✅ Saved {}", path.display());
                    }
                    Err(e) => {
                        log::error!("Error generating image: {}", e);
                    }
                }
                Task::none()
            }
            Message::AddFolder => {
                let folder = FileDialog::new()
                    .set_title("Select Folder with Photos")
                    .pick_folder();

                match folder {
                    Some(folder) => {
                        self.status = format!("Scanning {}...", folder.display());
                        Task::perform(import::import_folder_async(folder), Message::ImportComplete)
                    }
                    None => Task::none(),
                }
            }
            Message::ImportComplete(result) => {
                let added = import::merge_sources(&mut self.sources, result.references.clone());
                self.status = format!(
                    "Added {} images from {}.",
                    added,
                    result.folder.display()
                );

                self.request_loads(result.references, Fidelity::Thumbnail)
            }
        }
    }

    /// Start loading every reference not seen before at this fidelity
    fn request_loads(
        &mut self,
        references: impl IntoIterator<Item = ImageRef>,
        fidelity: Fidelity,
    ) -> Task<Message> {
        let tasks: Vec<Task<Message>> = references
            .into_iter()
            .filter(|reference| self.images.request(reference, fidelity))
            .map(|reference| {
                Task::perform(self.loader.load(reference.clone(), fidelity), move |result| {
                    Message::ImageLoaded(reference.clone(), fidelity, result)
                })
            })
            .collect();

        Task::batch(tasks)
    }

    fn image_loaded(
        &mut self,
        reference: ImageRef,
        fidelity: Fidelity,
        result: Result<LoadedImage, LoadError>,
    ) -> Task<Message> {
        let loaded = result.is_ok();
        if let Err(e) = &result {
            log::warn!("⚠️  Failed to load {}: {}", reference, e);
        }
        self.images.finish(reference.clone(), fidelity, result);

        // Exports only wait for the pixels placed in the grid
        if fidelity == Fidelity::Thumbnail {
            return Task::none();
        }
        self.images.evict_unused(&self.grid);

        let Some(export) = self.export.as_mut() else {
            return Task::none();
        };

        let progress = if loaded {
            export.image_loaded(&reference)
        } else {
            export.image_failed(&reference)
        };

        match progress {
            ExportProgress::Ready => {
                self.export = None;
                self.rasterize()
            }
            ExportProgress::Waiting { remaining } => {
                self.status = format!("Waiting for {} images to load...", remaining);
                Task::none()
            }
            ExportProgress::Finished => Task::none(),
        }
    }

    fn start_export(&mut self) -> Task<Message> {
        let (export, progress) = PendingExport::begin(&self.grid, &self.images);

        match progress {
            ExportProgress::Ready => {
                self.export = None;
                self.rasterize()
            }
            ExportProgress::Waiting { remaining } => {
                log::info!(
                    "⏳ Export waiting for {} of {} images ({} loads in flight)",
                    remaining,
                    export.total(),
                    self.images.pending_count()
                );
                self.status = format!("Waiting for {} images to load...", remaining);
                self.export = Some(export);
                Task::none()
            }
            ExportProgress::Finished => Task::none(),
        }
    }

    /// Snapshot the grid and rasterize it in the background
    fn rasterize(&mut self) -> Task<Message> {
        let sink = match &self.config.download_dir {
            Some(dir) => Some(DownloadsFolder::new(dir.clone())),
            None => DownloadsFolder::user_default(),
        };
        let Some(sink) = sink else {
            log::error!("Error generating image: no download directory available");
            return Task::none();
        };

        let scene = Scene::capture(&self.grid, &self.images);
        let rasterizer = PngRasterizer::new(self.config.export_scale);
        self.exports_started += 1;
        self.status = "Generating image...".to_string();
        log::info!(
            "🖼️  Export #{}: {} of {} frames filled",
            self.exports_started,
            scene.filled_count(),
            FRAME_COUNT
        );

        Task::perform(
            export::export_async(scene, rasterizer, sink, self.config.export_filename.clone()),
            Message::ExportFinished,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = row![
            text("Drag and Drop Photo Grid").size(32),
            button(text("Download as Image"))
                .padding([10, 20])
                .on_press(Message::DownloadPressed)
                .style(download_button_style),
            button(text("Add Folder"))
                .padding([10, 20])
                .on_press(Message::AddFolder),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let content = column![
            header,
            ui::source::tray(&self.sources, &self.images, &self.drag),
            ui::grid::photo_grid(&self.grid, &self.images, &self.drag),
            text(&self.status).size(14),
        ]
        .spacing(20)
        .padding(20)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Every left-button release ends the drag gesture
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(pointer_released)
    }

    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn pointer_released(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
        | Event::Touch(touch::Event::FingerLifted { .. }) => Some(Message::PointerReleased),
        _ => None,
    }
}

fn download_button_style(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => Color::from_rgb8(0x00, 0x69, 0xd9),
        _ => Color::from_rgb8(0x00, 0x7b, 0xff),
    };

    button::Style {
        background: Some(background.into()),
        text_color: Color::WHITE,
        border: Border {
            radius: 5.0.into(),
            ..Border::default()
        },
        ..button::Style::default()
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Story Grid", StoryGrid::update, StoryGrid::view)
        .theme(StoryGrid::theme)
        .subscription(StoryGrid::subscription)
        .window_size((760.0, 960.0))
        .centered()
        .run_with(StoryGrid::new)
}
