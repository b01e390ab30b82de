//! App shell: owns the map session and routes backend events into it.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender};
use listings::{ListSummary, ListingQuery};
use map_core::{
    BackgroundImage, MapError, MapSession, MapSettings, PropertyPopup, SuggestionSearch,
};
use shared::{domain::PropertyId, protocol::GeoCandidate};
use url::Url;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{ImageryFailure, UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

use super::{credential_prompt, list_view, map_canvas, popup, popup::PhotoState};

const IDLE_REPAINT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Map,
    List,
}

/// Filter bar inputs, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub text: String,
    pub kind: Option<String>,
    pub min_rating: f32,
}

impl FilterState {
    pub fn to_query(&self) -> ListingQuery {
        let text = self.text.trim();
        ListingQuery {
            text: (!text.is_empty()).then(|| text.to_string()),
            kind: self.kind.clone(),
            min_rating: (self.min_rating > 0.0).then_some(self.min_rating),
        }
    }
}

pub struct LoadedBackground {
    pub image: BackgroundImage,
    pub texture: egui::TextureHandle,
}

/// Imagery for the map canvas: map tiles or a single static map. `generation`
/// changes whenever the provider restarts, and only responses from the
/// current generation for images still wanted are kept.
#[derive(Default)]
struct BackgroundLayer {
    generation: u64,
    wanted: Vec<Url>,
    pending: Vec<Url>,
    loaded: Vec<LoadedBackground>,
}

impl BackgroundLayer {
    /// Records what the viewport needs and returns the images still to fetch.
    fn want(&mut self, images: Vec<BackgroundImage>) -> Vec<(u64, BackgroundImage)> {
        let urls: Vec<Url> = images.iter().map(|image| image.url.clone()).collect();
        if urls == self.wanted {
            return Vec::new();
        }
        self.pending.retain(|url| urls.contains(url));
        let fetch: Vec<BackgroundImage> = images
            .into_iter()
            .filter(|image| !self.pending.contains(&image.url) && !self.has(&image.url))
            .collect();
        self.pending
            .extend(fetch.iter().map(|image| image.url.clone()));
        self.wanted = urls;
        fetch
            .into_iter()
            .map(|image| (self.generation, image))
            .collect()
    }

    fn has(&self, url: &Url) -> bool {
        self.loaded.iter().any(|tile| &tile.image.url == url)
    }

    fn accepts(&self, generation: u64, url: &Url) -> bool {
        generation == self.generation && self.wanted.contains(url)
    }

    /// Stores a fetched image. Imagery the viewport no longer needs stays on
    /// screen until its replacement starts arriving.
    fn insert(&mut self, tile: LoadedBackground) {
        self.pending.retain(|url| url != &tile.image.url);
        let wanted = &self.wanted;
        self.loaded
            .retain(|loaded| wanted.contains(&loaded.image.url) && loaded.image.url != tile.image.url);
        self.loaded.push(tile);
    }

    fn settle(&mut self, url: &Url) {
        self.pending.retain(|pending| pending != url);
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.wanted.clear();
        self.pending.clear();
        self.loaded.clear();
    }
}

pub struct RentalMapApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: MapSession,
    search: SuggestionSearch,
    location_input: String,
    view: ViewMode,
    filter: FilterState,
    active_query: ListingQuery,
    summary: Option<ListSummary>,
    kinds: Vec<String>,
    credential_input: String,
    background: BackgroundLayer,
    photos: HashMap<PropertyId, PhotoState>,
    status: String,
    last_error: Option<UiError>,
}

impl RentalMapApp {
    pub fn new(
        settings: MapSettings,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        let search = SuggestionSearch::from_settings(&settings);
        let session = MapSession::open(settings, Vec::new());
        let mut app = Self {
            cmd_tx,
            ui_rx,
            session,
            search,
            location_input: String::new(),
            view: ViewMode::Map,
            filter: FilterState::default(),
            active_query: ListingQuery::default(),
            summary: None,
            kinds: Vec::new(),
            credential_input: String::new(),
            background: BackgroundLayer::default(),
            photos: HashMap::new(),
            status: "Loading listings…".to_string(),
            last_error: None,
        };
        app.dispatch(BackendCommand::LoadKinds);
        app.dispatch(BackendCommand::LoadProperties {
            query: ListingQuery::default(),
        });
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status)
    }

    fn report(&mut self, err: UiError) {
        tracing::warn!(
            context = ?err.context(),
            category = ?err.category(),
            "{}",
            err.message()
        );
        self.status = err.message().to_string();
        self.last_error = Some(err);
    }

    fn report_map_error(&mut self, err: &MapError) {
        self.report(UiError::from_map_error(err));
    }

    /// Asks the worker for the list matching the filter bar, unless that
    /// list is already the one shown or in flight.
    fn request_properties(&mut self) {
        let query = self.filter.to_query();
        if query == self.active_query {
            return;
        }
        self.active_query = query.clone();
        self.summary = None;
        self.dispatch(BackendCommand::LoadProperties { query });
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                    self.last_error = None;
                }
                UiEvent::Error(err) => self.report(err),
                UiEvent::PropertiesLoaded { query, properties } => {
                    if query != self.active_query {
                        tracing::debug!("discarding property list for a superseded filter");
                        continue;
                    }
                    let count = properties.len();
                    if let Err(err) = self.session.refresh_properties(properties) {
                        self.report_map_error(&err);
                    }
                    let summary = ListSummary::for_results(&query, count);
                    self.status = summary.headline();
                    self.summary = Some(summary);
                }
                UiEvent::KindsLoaded(kinds) => self.kinds = kinds,
                UiEvent::GeocodeCompleted { seq, result } => {
                    self.search.accept(seq, result);
                }
                UiEvent::BackgroundLoaded {
                    generation,
                    image,
                    pixels,
                } => {
                    if !self.background.accepts(generation, &image.url) {
                        continue;
                    }
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(
                        [pixels.width, pixels.height],
                        &pixels.rgba,
                    );
                    let (wx, wy) = image.world_origin;
                    let texture = ctx.load_texture(
                        format!("map-background:{generation}:{}:{wx:.0}:{wy:.0}", image.zoom),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.background.insert(LoadedBackground { image, texture });
                }
                UiEvent::BackgroundFailed {
                    generation,
                    image,
                    failure,
                } => {
                    if !self.background.accepts(generation, &image.url) {
                        continue;
                    }
                    self.background.settle(&image.url);
                    self.apply_imagery_failure(failure);
                }
                UiEvent::PhotoLoaded { id, pixels } => {
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(
                        [pixels.width, pixels.height],
                        &pixels.rgba,
                    );
                    let texture = ctx.load_texture(
                        format!("property-photo:{id}"),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.photos.insert(id, PhotoState::Ready(texture));
                }
                UiEvent::PhotoFailed { id, reason } => {
                    tracing::warn!(%id, "listing photo unavailable: {reason}");
                    self.photos.insert(id, PhotoState::Unavailable);
                }
            }
        }
    }

    fn apply_imagery_failure(&mut self, failure: ImageryFailure) {
        match failure {
            ImageryFailure::CredentialRejected { status } => {
                let provider = self.session.settings().provider;
                let err = MapError::InvalidCredential {
                    provider,
                    reason: format!("{provider} refused the credential (HTTP {status})"),
                };
                self.background.reset();
                self.report_map_error(&err);
                self.session.report_provider_failure(err);
            }
            ImageryFailure::Unavailable(reason) => {
                tracing::warn!("map imagery unavailable: {reason}");
                self.status = format!("Map imagery unavailable: {reason}");
            }
        }
    }

    fn submit_credential(&mut self, input: &str) {
        if self.session.submit_credential(input) {
            self.credential_input.clear();
            self.background.reset();
            self.last_error = None;
            self.status = format!("{} map ready", self.session.settings().provider);
        } else if let Some(prompt) = self.session.prompt() {
            self.status = prompt.reason().to_string();
        }
    }

    fn show_on_map(&mut self, id: PropertyId) {
        self.view = ViewMode::Map;
        let Some(controller) = self.session.controller_mut() else {
            return;
        };
        let position = controller
            .properties()
            .iter()
            .find(|property| property.id == id)
            .map(|property| property.position);
        if let Err(err) = controller.select_marker(id) {
            self.report_map_error(&err);
            return;
        }
        if let Some(position) = position {
            controller.pan_to(position);
        }
    }

    fn pick_location(&mut self, candidate: GeoCandidate) {
        self.search.dismiss();
        if let Some(controller) = self.session.controller_mut() {
            controller.pan_to(candidate.position);
        }
        self.location_input = candidate.label;
    }

    fn poll_geocoder(&mut self, now: Instant) {
        if let Some(request) = self.search.poll(now) {
            self.dispatch(BackendCommand::Geocode(request));
        }
    }

    fn next_repaint(&self, now: Instant) -> Duration {
        self.search
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .map_or(IDLE_REPAINT, |wait| wait.min(IDLE_REPAINT))
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        let filter_changed = egui::TopBottomPanel::top("filter_bar")
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Rentals");
                    ui.separator();
                    ui.selectable_value(&mut self.view, ViewMode::Map, "Map");
                    ui.selectable_value(&mut self.view, ViewMode::List, "List");
                    ui.separator();

                    let mut changed = ui
                        .add(
                            egui::TextEdit::singleline(&mut self.filter.text)
                                .hint_text("Filter by name, address or type")
                                .desired_width(220.0),
                        )
                        .changed();
                    let kind_label = self
                        .filter
                        .kind
                        .clone()
                        .unwrap_or_else(|| "Any type".to_string());
                    egui::ComboBox::from_id_salt("kind_filter")
                        .selected_text(kind_label)
                        .show_ui(ui, |ui| {
                            changed |= ui
                                .selectable_value(&mut self.filter.kind, None, "Any type")
                                .changed();
                            for kind in &self.kinds {
                                changed |= ui
                                    .selectable_value(
                                        &mut self.filter.kind,
                                        Some(kind.clone()),
                                        kind.as_str(),
                                    )
                                    .changed();
                            }
                        });
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut self.filter.min_rating, 0.0..=5.0)
                                .step_by(0.5)
                                .text("min rating"),
                        )
                        .changed();

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        match &self.summary {
                            Some(summary) => {
                                ui.label(egui::RichText::new(summary.headline()).strong());
                            }
                            None => {
                                ui.spinner();
                            }
                        }
                    });
                    changed
                })
                .inner
            })
            .inner;

        if filter_changed {
            self.request_properties();
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.last_error {
                Some(err) => {
                    ui.colored_label(ui.visuals().error_fg_color, err.message());
                }
                None => {
                    ui.weak(&self.status);
                }
            });
        });
    }

    fn show_map_view(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                if self.session.is_live() {
                    self.show_live_map(ui);
                } else {
                    self.show_credential_prompt(ui);
                }
            });
    }

    fn show_live_map(&mut self, ui: &mut egui::Ui) {
        let Some(controller) = self.session.controller_mut() else {
            return;
        };
        let canvas = map_canvas::show(ui, controller, &self.background.loaded);
        if let Some(err) = canvas.error {
            self.report_map_error(&err);
        }

        if !canvas.interacting {
            self.request_background();
        }

        self.show_location_search(ui.ctx(), canvas.rect);
    }

    fn request_background(&mut self) {
        let wanted = self
            .session
            .controller()
            .map(|controller| controller.provider().background())
            .unwrap_or_default();
        for (generation, image) in self.background.want(wanted) {
            self.dispatch(BackendCommand::FetchBackground { generation, image });
        }
    }

    fn show_location_search(&mut self, ctx: &egui::Context, map_rect: egui::Rect) {
        let mut picked = None;
        egui::Area::new(egui::Id::new("location_search"))
            .order(egui::Order::Foreground)
            .fixed_pos(map_rect.left_top() + egui::vec2(12.0, 12.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(280.0);
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.location_input)
                            .hint_text("Search a neighbourhood or address"),
                    );
                    if response.changed() {
                        self.search.on_input(&self.location_input, Instant::now());
                    }
                    if self.search.is_waiting() {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.weak("Searching…");
                        });
                    }
                    for candidate in self.search.suggestions() {
                        if ui
                            .add(egui::Button::new(candidate.label.as_str()).frame(false))
                            .clicked()
                        {
                            picked = Some(candidate.clone());
                        }
                    }
                });
            });

        if let Some(candidate) = picked {
            self.pick_location(candidate);
        }
    }

    fn show_credential_prompt(&mut self, ui: &mut egui::Ui) {
        let Some(prompt) = self.session.prompt() else {
            return;
        };
        if let Some(input) = credential_prompt::show(ui, prompt, &mut self.credential_input) {
            self.submit_credential(&input);
        }
    }

    fn show_list_view(&mut self, ctx: &egui::Context) {
        let picked = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let selected = self
                    .session
                    .controller()
                    .and_then(|controller| controller.selection().property_id());
                list_view::show(
                    ui,
                    self.session.properties(),
                    self.summary.as_ref(),
                    selected,
                )
            })
            .inner;
        if let Some(id) = picked {
            self.show_on_map(id);
        }
    }

    /// Asks the worker for the listing photo the first time a popup needs it.
    fn request_photo(&mut self, details: &PropertyPopup) {
        let Some(raw) = details.image.as_deref() else {
            return;
        };
        if self.photos.contains_key(&details.id) {
            return;
        }
        match Url::parse(raw) {
            Ok(url) => {
                self.photos.insert(details.id, PhotoState::Loading);
                if !self.dispatch(BackendCommand::FetchPhoto { id: details.id, url }) {
                    self.photos.remove(&details.id);
                }
            }
            Err(err) => {
                tracing::warn!(id = %details.id, "invalid listing photo url: {err}");
                self.photos.insert(details.id, PhotoState::Unavailable);
            }
        }
    }

    fn show_popup(&mut self, ctx: &egui::Context) {
        let Some(details) = self.session.controller().and_then(|c| c.popup()) else {
            return;
        };
        self.request_photo(&details);
        if !popup::show(ctx, &details, self.photos.get(&details.id)) {
            return;
        }
        if let Some(controller) = self.session.controller_mut() {
            if let Err(err) = controller.clear_selection() {
                self.report_map_error(&err);
            }
        }
    }
}

impl eframe::App for RentalMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);

        self.show_top_bar(ctx);
        self.show_status_bar(ctx);
        match self.view {
            ViewMode::Map => self.show_map_view(ctx),
            ViewMode::List => self.show_list_view(ctx),
        }
        self.show_popup(ctx);

        let now = Instant::now();
        self.poll_geocoder(now);
        ctx.request_repaint_after(self.next_repaint(now));
    }
}
