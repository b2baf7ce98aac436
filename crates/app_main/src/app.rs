//! Application main loop

use anyhow::Result;
use app_core::{
    AppConfig, Category, Command, CommandOutcome, Gallery, ImageRecord, NavDirection, ParticleAnimation,
    ParticleField, TaskEvent, TaskHub,
};
use app_ui::{
    components::{
        FilterBar, GalleryGrid, GridAction, Header, HeaderAction, Lightbox, LightboxAction, LightboxView,
        ParticleLayer, ScrollLock, StatusBar, StatusInfo, UploadAction, UploadDialog,
    },
    InputHandler, Renderer, TextureCache, Theme,
};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Everything the UI reported during one frame
enum UiAction {
    Header(HeaderAction),
    Filter(Category),
    Grid(GridAction),
    Lightbox(LightboxAction),
    Upload(UploadAction),
}

/// Main application state for the event loop
struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,

    input_handler: InputHandler,
    theme: Theme,

    // Domain
    gallery: Gallery,
    tasks: TaskHub,
    events: Receiver<TaskEvent>,

    // UI state
    textures: TextureCache,
    scroll_lock: ScrollLock,
    lightbox: Option<Lightbox>,
    upload_dialog: UploadDialog,
    particles: Option<ParticleAnimation>,
    status: StatusInfo,
    exit_requested: bool,
}

impl App {
    fn new(config: AppConfig, handle: tokio::runtime::Handle) -> Result<Self> {
        let (tasks, events) = TaskHub::new(handle)?;

        let gallery = Gallery::new(
            app_core::default_images(),
            config.gallery.view_mode,
            &config.upload.default_category,
        );

        Ok(Self {
            input_handler: InputHandler::new(config.keybindings.clone()),
            theme: Theme::by_name(&config.general.theme),
            config,
            window: None,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,

            gallery,
            tasks,
            events,

            textures: TextureCache::new(),
            scroll_lock: ScrollLock::new(),
            lightbox: None,
            upload_dialog: UploadDialog::new(),
            particles: None,
            status: StatusInfo::default(),
            exit_requested: false,
        })
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title("Image Gallery")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.general.window_width,
                self.config.general.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // Initialize renderer
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        // Initialize egui
        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        // Apply theme
        self.theme.apply(&self.egui_ctx);

        if self.config.particles.enabled {
            let size = window.inner_size().to_logical::<f32>(window.scale_factor());
            let field = ParticleField::new(
                self.config.particles.count,
                size.width,
                size.height,
                &mut rand::thread_rng(),
            );
            self.particles = Some(ParticleAnimation::start(
                self.tasks.handle(),
                field,
                self.config.particles.tick_interval(),
            ));
        }

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.egui_state = Some(egui_state);

        tracing::info!(images = self.gallery.images().len(), "Window ready");
        Ok(())
    }

    // ========================================
    // Background completions
    // ========================================

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                TaskEvent::ImageLoaded { id, image } => {
                    self.textures.insert(&self.egui_ctx, id, &image);
                }
                TaskEvent::ImageFailed { id, .. } => {
                    self.textures.fail(id);
                }
                TaskEvent::FilesRead { session, files, skipped } => {
                    if skipped > 0 {
                        self.status.info(format!("Skipped {} non-image file(s)", skipped));
                    }
                    for job in self.gallery.accept_files(session, files) {
                        self.tasks.decode_preview(job, self.config.upload.preview_size);
                    }
                }
                TaskEvent::PreviewReady { session, entry, result } => {
                    self.gallery.apply_preview(session, entry, result);
                }
                TaskEvent::UploadFinished { session, records } => {
                    let count = records.len();
                    if self.gallery.complete_upload(session, records) {
                        self.upload_dialog.reset();
                        self.status.info(format!("Uploaded {} image(s)", count));
                    }
                }
                TaskEvent::DownloadFinished { name, result } => match result {
                    Ok(path) => self.status.info(format!("Saved {}", path.display())),
                    Err(e) => self.status.error(format!("Download of {} failed: {}", name, e.user_message())),
                },
            }
        }
    }

    /// Keep the lightbox (and its scroll lock) alive exactly while the viewer is open
    fn sync_lightbox(&mut self) {
        match (self.gallery.is_viewer_open(), self.lightbox.is_some()) {
            (true, false) => self.lightbox = Some(Lightbox::open(&self.scroll_lock)),
            (false, true) => self.lightbox = None,
            _ => {}
        }
    }

    // ========================================
    // Actions
    // ========================================

    fn start_download(&mut self, record: ImageRecord) {
        tracing::info!(id = %record.id, "Download requested");
        self.status.info(format!("Downloading {}...", record.display_name));
        self.tasks.download(
            record,
            self.config.download.target_dir(),
            self.config.download.fallback_extension.clone(),
        );
    }

    fn reload_failed(&mut self) {
        let cleared = self.textures.clear_failed();
        self.status.info(format!("Retrying {} image(s)", cleared));
    }

    fn open_upload(&mut self) {
        self.gallery.open_upload();
    }

    fn close_upload(&mut self) {
        self.gallery.close_upload();
        self.upload_dialog.reset();
    }

    fn execute_command(&mut self, cmd: &Command) {
        match self.gallery.execute(cmd) {
            Ok(CommandOutcome::Handled | CommandOutcome::Ignored) => {}
            Ok(CommandOutcome::Download(record)) => self.start_download(record),
            Ok(CommandOutcome::Reload) => self.reload_failed(),
            Ok(CommandOutcome::Exit) => self.exit_requested = true,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Command {} failed: {}", cmd.id.as_str(), e);
                self.status.error(e.user_message());
            }
            Err(e) => {
                tracing::error!("Command {} failed: {}", cmd.id.as_str(), e);
                self.status.error(e.user_message());
            }
        }
        // Preview textures belong to the session that just closed
        if !self.gallery.is_upload_open() {
            self.upload_dialog.reset();
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Header(HeaderAction::ToggleView) => {
                self.gallery.toggle_view_mode();
            }
            UiAction::Header(HeaderAction::Reload) => self.reload_failed(),
            UiAction::Header(HeaderAction::OpenUpload) => self.open_upload(),

            UiAction::Filter(category) => {
                if let Err(e) = self.gallery.set_category(category) {
                    self.status.error(e.user_message());
                }
            }

            UiAction::Grid(GridAction::Open(id)) => {
                if let Err(e) = self.gallery.open_viewer(&id) {
                    tracing::warn!("Cannot open viewer: {}", e);
                }
            }
            UiAction::Grid(GridAction::Download(id)) => {
                let record = self.gallery.images().iter().find(|r| r.id == id).cloned();
                if let Some(record) = record {
                    self.start_download(record);
                }
            }

            UiAction::Lightbox(LightboxAction::Close) => self.gallery.close_viewer(),
            UiAction::Lightbox(LightboxAction::Prev) => {
                self.gallery.navigate(NavDirection::Prev);
            }
            UiAction::Lightbox(LightboxAction::Next) => {
                self.gallery.navigate(NavDirection::Next);
            }
            UiAction::Lightbox(LightboxAction::Download) => {
                if let Some(record) = self.gallery.current_image().cloned() {
                    self.start_download(record);
                }
            }

            UiAction::Upload(UploadAction::Close) => self.close_upload(),
            UiAction::Upload(UploadAction::Submit) => match self.gallery.begin_upload() {
                Ok((session, records)) => {
                    self.tasks
                        .simulate_upload(session, records, self.config.upload.simulated_delay());
                }
                Err(e) => self.status.error(e.user_message()),
            },
            UiAction::Upload(UploadAction::FilesChosen(paths)) => {
                if let Some(session) = self.gallery.upload_session() {
                    self.tasks.read_files(session.id(), paths);
                }
            }
            UiAction::Upload(UploadAction::Remove(entry)) => {
                if let Some(session) = self.gallery.upload_session_mut() {
                    session.remove_entry(entry);
                }
            }
            UiAction::Upload(UploadAction::CategoryChanged(category)) => {
                if let Some(session) = self.gallery.upload_session_mut() {
                    session.set_category(&category);
                }
            }
        }
    }

    /// Route OS drag-and-drop into the upload dialog, opening it on drop
    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| (!i.raw.hovered_files.is_empty(), i.raw.dropped_files.clone()));

        if !dropped.is_empty() && !self.gallery.is_upload_open() {
            self.open_upload();
        }

        let Some(session) = self.gallery.upload_session_mut() else {
            return;
        };
        session.set_drag_active(hovering);
        if dropped.is_empty() {
            return;
        }

        let mut paths = Vec::new();
        let mut in_memory = Vec::new();
        for file in dropped {
            match (file.path, file.bytes) {
                (Some(path), _) => paths.push(path),
                (None, Some(bytes)) => in_memory.push((file.name, bytes)),
                (None, None) => tracing::debug!("Dropped item without path or data: {}", file.name),
            }
        }

        // Data already in memory is only sniffed here; disk reads go to the hub
        let jobs = session.add_files(in_memory);
        if !paths.is_empty() {
            self.tasks.read_files(session.id(), paths);
        }
        for job in jobs {
            self.tasks.decode_preview(job, self.config.upload.preview_size);
        }
    }

    // ========================================
    // Frame
    // ========================================

    fn ui(&mut self, ctx: &egui::Context) {
        self.handle_file_drops(ctx);

        // Start loads for everything visible under the current filter
        let max_edge = self.config.gallery.max_texture_size;
        for record in self.gallery.filtered() {
            if self.textures.request(&record.id) {
                self.tasks.load_image(record, max_edge);
            }
        }

        if let Some(particles) = &self.particles {
            ParticleLayer::paint(ctx, &particles.snapshot(), egui::Pos2::ZERO, &self.theme);
        }

        self.status.count = format!(
            "{} of {} images",
            self.gallery.filtered_len(),
            self.gallery.images().len()
        );
        self.status.view_mode = self.gallery.view_mode().label().to_string();

        let theme = &self.theme;
        let mut actions = Vec::new();

        egui::TopBottomPanel::bottom("status")
            .frame(egui::Frame::none().inner_margin(egui::Margin::symmetric(16.0, 6.0)))
            .show(ctx, |ui| {
                StatusBar::ui(ui, &self.status, theme);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().inner_margin(egui::Margin::symmetric(32.0, 8.0)))
            .show(ctx, |ui| {
                if let Some(action) = Header::ui(ui, self.gallery.view_mode(), self.gallery.images().len(), theme) {
                    actions.push(UiAction::Header(action));
                }

                if let Some(category) =
                    FilterBar::ui(ui, self.gallery.categories(), self.gallery.selected_category(), theme)
                {
                    actions.push(UiAction::Filter(category));
                }
                ui.add_space(16.0);

                let filtered = self.gallery.filtered();
                if let Some(action) = GalleryGrid::ui(
                    ui,
                    &filtered,
                    &self.textures,
                    self.gallery.view_mode(),
                    !self.scroll_lock.is_locked(),
                    theme,
                ) {
                    actions.push(UiAction::Grid(action));
                }
            });

        if let (Some(lightbox), Some(record)) = (&self.lightbox, self.gallery.current_image()) {
            let view = LightboxView {
                record,
                texture: self.textures.texture(&record.id),
                position: self.gallery.position_label().unwrap_or_default(),
                can_navigate: self.gallery.can_navigate(),
            };
            if let Some(action) = lightbox.ui(ctx, &view, theme) {
                actions.push(UiAction::Lightbox(action));
            }
        }

        if let Some(session) = self.gallery.upload_session() {
            if let Some(action) = self.upload_dialog.ui(ctx, session, &self.config.upload.categories, theme) {
                actions.push(UiAction::Upload(action));
            }
        }

        for action in actions {
            self.apply(action);
        }
    }

    fn render(&mut self) {
        let window = match &self.window {
            Some(w) => w.clone(),
            None => return,
        };

        self.drain_events();
        self.sync_lightbox();

        let raw_input = match &mut self.egui_state {
            Some(state) => state.take_egui_input(&window),
            None => return,
        };

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| self.ui(ctx));

        // Actions may have opened or closed the viewer
        self.sync_lightbox();

        if let Some(egui_state) = &mut self.egui_state {
            egui_state.handle_platform_output(&window, full_output.platform_output);
        }

        let clipped_primitives = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        if let Some(renderer) = &mut self.renderer {
            renderer.render_egui(
                &clipped_primitives,
                &full_output.textures_delta,
                full_output.pixels_per_point,
                self.theme.background,
            );
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to initialize window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.consumed {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((size.width, size.height));
                }
                if let (Some(particles), Some(window)) = (&self.particles, &self.window) {
                    let logical = size.to_logical::<f32>(window.scale_factor());
                    particles.resize(logical.width, logical.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(cmd) = self.input_handler.handle_key(&event) {
                    self.execute_command(&cmd);
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.input_handler.update_modifiers(modifiers.state());
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            _ => {}
        }

        if self.exit_requested {
            tracing::info!("Exit requested");
            event_loop.exit();
            return;
        }

        // Request redraw
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Stop the particle task before the runtime shuts down
        self.particles = None;
    }
}

/// Run the application
pub fn run(config: AppConfig, handle: tokio::runtime::Handle) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, handle)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
