//! Experiment document and its lifecycle.

use crate::camera::Camera;
use crate::elements::{Element, ElementId, ElementKind, PinRef};
use crate::error::{ExperimentError, Result};
use crate::format::{
    ElementRecord, Envelope, ExperimentType, PREVIEW_EXTENSION, SAV_EXTENSION, StatusPayload,
    WireRecord,
};
use crate::grid::{Footprint, GridFrame};
use crate::position::{Position, Rotation};
use crate::registry::ElementRegistry;
use crate::storage::{Storage, StorageError};
use crate::wire::{Wire, WireColor, WireSet};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Where an experiment is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Unopened,
    /// Loaded from an existing save file.
    Opened,
    /// Created from a template; no file exists until written.
    Created,
    Written,
    Deleted,
    Exited,
}

/// How `open` interprets its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Match the display name (`InternalName`) of saves in the root directory.
    #[default]
    ByName,
    /// A file name relative to the root directory.
    ByFileName,
    /// A path used as-is.
    ByPath,
}

/// What a call to [`Experiment::read`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Loaded { elements: usize, wires: usize },
    /// The experiment was read before; nothing changed.
    AlreadyRead,
    /// The experiment was created, so there is no saved state.
    NothingToRead,
}

impl ReadOutcome {
    /// Whether the read was skipped with a warning.
    pub fn is_warning(&self) -> bool {
        !matches!(self, ReadOutcome::Loaded { .. })
    }
}

/// An experiment document.
///
/// Holds the envelope of one save file together with the modeled parts of
/// its status payload (elements, wires) and camera.
#[derive(Debug, Clone)]
pub struct Experiment {
    state: LifecycleState,
    has_read: bool,
    /// Backing save file.
    path: PathBuf,
    envelope: Envelope,
    camera: Camera,
    simulation_speed: f64,
    /// Status payload fields not modeled here.
    status_extra: Map<String, Value>,
    registry: ElementRegistry,
    wires: WireSet,
    grid: GridFrame,
}

impl Default for Experiment {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn preview_path(path: &Path) -> PathBuf {
    path.with_extension(PREVIEW_EXTENSION)
}

/// Number of entries under `Elements` in an unmodeled status payload.
fn carried_element_count(status_save: &str) -> Result<usize> {
    if status_save.trim().is_empty() {
        return Ok(0);
    }
    let status: Value = serde_json::from_str(status_save)?;
    Ok(match status.get("Elements") {
        Some(Value::Object(bodies)) => bodies.len(),
        Some(Value::Array(bodies)) => bodies.len(),
        _ => 0,
    })
}

/// Find the save in the storage root whose display name is `name`.
///
/// Files that cannot be read or parsed are skipped.
pub fn find_by_name(storage: &dyn Storage, name: &str) -> Result<Option<(PathBuf, Envelope)>> {
    for path in storage.list()? {
        let parsed = storage
            .read(&path)
            .map_err(ExperimentError::from)
            .and_then(|text| Envelope::parse(&text));
        let envelope = match parsed {
            Ok(envelope) => envelope,
            Err(e) => {
                log::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if envelope.name() == name {
            return Ok(Some((path, envelope)));
        }
    }
    Ok(None)
}

impl Experiment {
    /// Create an unopened experiment.
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Unopened,
            has_read: false,
            path: PathBuf::new(),
            envelope: Envelope::template(ExperimentType::Circuit),
            camera: Camera::default(),
            simulation_speed: 1.0,
            status_extra: Map::new(),
            registry: ElementRegistry::new(),
            wires: WireSet::new(),
            grid: GridFrame::default(),
        }
    }

    fn load(&mut self, path: PathBuf, envelope: Envelope, camera: Camera, state: LifecycleState) {
        *self = Self {
            state,
            path,
            envelope,
            camera,
            ..Self::new()
        };
    }

    fn require_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(ExperimentError::NotOpen)
        }
    }

    // ---- Lifecycle ----

    /// Open an existing save.
    pub fn open(&mut self, storage: &dyn Storage, target: &str, mode: OpenMode) -> Result<()> {
        if self.is_open() {
            return Err(ExperimentError::AlreadyOpen);
        }

        let (path, envelope) = match mode {
            OpenMode::ByName => find_by_name(storage, target)?
                .ok_or_else(|| ExperimentError::NotFound(format!("experiment named {}", target)))?,
            OpenMode::ByFileName | OpenMode::ByPath => {
                let path = match mode {
                    OpenMode::ByFileName => storage.root().join(target),
                    _ => PathBuf::from(target),
                };
                let text = match storage.read(&path) {
                    Ok(text) => text,
                    Err(StorageError::NotFound(_)) => {
                        return Err(ExperimentError::NotFound(path.display().to_string()));
                    }
                    Err(e) => return Err(e.into()),
                };
                (path, Envelope::parse(&text)?)
            }
        };

        let camera = if envelope.experiment.camera_save.trim().is_empty() {
            Camera::for_type(envelope.experiment_type)
        } else {
            Camera::from_camera_save(&envelope.experiment.camera_save)?
        };
        log::debug!("Opened {} from {}", envelope.name(), path.display());
        self.load(path, envelope, camera, LifecycleState::Opened);
        Ok(())
    }

    /// Create a new experiment named `name`.
    ///
    /// With `force`, an existing save of the same name is deleted first
    /// (together with its preview image).
    pub fn crt(
        &mut self,
        storage: &dyn Storage,
        name: &str,
        experiment_type: ExperimentType,
        force: bool,
    ) -> Result<()> {
        if self.is_open() {
            return Err(ExperimentError::AlreadyOpen);
        }

        if let Some((existing, _)) = find_by_name(storage, name)? {
            if !force {
                return Err(ExperimentError::AlreadyExists(name.to_string()));
            }
            storage.remove(&existing)?;
            match storage.remove(&preview_path(&existing)) {
                Ok(()) | Err(StorageError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
            log::info!("Replaced existing experiment {}", name);
        }

        let file_name = format!("{}.{}", Uuid::new_v4().simple(), SAV_EXTENSION);
        let path = storage.root().join(file_name);
        let mut envelope = Envelope::template(experiment_type);
        envelope.set_name(name);

        self.load(path, envelope, Camera::for_type(experiment_type), LifecycleState::Created);
        log::info!("Created {} experiment {}", experiment_type, name);
        Ok(())
    }

    /// Load elements and wires from the saved status payload.
    ///
    /// Only the first call on an opened experiment does anything; later
    /// calls, and calls on a created experiment, log a warning.
    pub fn read(&mut self) -> Result<ReadOutcome> {
        self.require_open()?;
        if self.has_read {
            log::warn!("Experiment {} has already been read", self.name());
            return Ok(ReadOutcome::AlreadyRead);
        }
        if self.state == LifecycleState::Created {
            self.has_read = true;
            log::warn!("Cannot read {}: it was created, not opened", self.name());
            return Ok(ReadOutcome::NothingToRead);
        }

        let experiment_type = self.experiment_type();
        if !experiment_type.models_elements() {
            let elements = carried_element_count(&self.envelope.experiment.status_save)?;
            self.has_read = true;
            log::debug!("Status of {} experiment {} is kept as-is", experiment_type, self.name());
            return Ok(ReadOutcome::Loaded { elements, wires: 0 });
        }

        let text = self.envelope.experiment.status_save.trim();
        let status = if text.is_empty() {
            StatusPayload::new(1.0, experiment_type.has_wires())
        } else {
            StatusPayload::decode(text)?
        };

        let mut registry = ElementRegistry::new();
        for record in status.elements {
            registry.insert(record.into_element()?)?;
        }
        let mut wires = WireSet::new();
        if experiment_type.has_wires() {
            for record in status.wires.unwrap_or_default() {
                let (source, target, color) = record.into_parts()?;
                wires.connect(&registry, source, target, color)?;
            }
        }

        self.simulation_speed = status.simulation_speed;
        self.status_extra = status.extra;
        self.registry = registry;
        self.wires = wires;
        self.has_read = true;
        Ok(ReadOutcome::Loaded {
            elements: self.registry.len(),
            wires: self.wires.len(),
        })
    }

    /// Encode the document into its envelope, stamping the creation date.
    fn encode(&mut self) -> Result<()> {
        let now = now_ms();
        self.envelope.experiment.creation_date = now;
        self.envelope.summary_mut().creation_date = now;
        self.envelope.experiment.camera_save = self.camera.to_camera_save()?;

        let experiment_type = self.experiment_type();
        if experiment_type.models_elements() {
            let status = StatusPayload {
                simulation_speed: self.simulation_speed,
                elements: self.registry.iter().map(ElementRecord::from_element).collect(),
                wires: experiment_type
                    .has_wires()
                    .then(|| self.wires.iter().map(WireRecord::from_wire).collect()),
                extra: self.status_extra.clone(),
            };
            self.envelope.experiment.status_save = status.encode()?;
        }
        Ok(())
    }

    /// Write the save file, and a copy to `extra_path` when given.
    ///
    /// Unless `keep_open`, the experiment moves to `Written` and further
    /// edits fail with `NotOpen`.
    pub fn write(&mut self, storage: &dyn Storage, extra_path: Option<&Path>, keep_open: bool) -> Result<()> {
        self.require_open()?;
        let action = if self.state == LifecycleState::Created { "create" } else { "update" };

        self.encode()?;
        let text = self.envelope.to_text()?;
        storage.write(&self.path, &text)?;
        if let Some(extra) = extra_path {
            let extra = if extra.extension().is_some_and(|ext| ext == SAV_EXTENSION) {
                extra.to_path_buf()
            } else {
                let mut name = extra.as_os_str().to_os_string();
                name.push(".");
                name.push(SAV_EXTENSION);
                PathBuf::from(name)
            };
            storage.write(&extra, &text)?;
        }

        if self.experiment_type().has_wires() {
            log::info!(
                "Successfully {}d experiment \"{}\"! {} elements, {} wires",
                action,
                self.name(),
                self.registry.len(),
                self.wires.len()
            );
        } else {
            log::info!(
                "Successfully {}d experiment \"{}\"! {} elements",
                action,
                self.name(),
                self.element_total()
            );
        }

        if !keep_open {
            self.state = LifecycleState::Written;
        }
        Ok(())
    }

    /// Delete the save file and its preview image.
    pub fn delete(&mut self, storage: &dyn Storage) -> Result<()> {
        self.require_open()?;

        match storage.remove(&self.path) {
            Ok(()) => log::info!("Deleted experiment \"{}\"", self.name()),
            Err(StorageError::NotFound(_)) if self.state == LifecycleState::Created => {
                log::warn!("Experiment \"{}\" was never written; nothing to delete", self.name());
            }
            Err(StorageError::NotFound(_)) => {
                log::warn!("Save file {} no longer exists", self.path.display());
            }
            Err(e) => return Err(e.into()),
        }
        match storage.remove(&preview_path(&self.path)) {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        self.state = LifecycleState::Deleted;
        Ok(())
    }

    /// Elements in the document, counting carried bodies for types whose
    /// status is not modeled.
    fn element_total(&self) -> usize {
        if self.experiment_type().models_elements() {
            self.registry.len()
        } else {
            carried_element_count(&self.envelope.experiment.status_save).unwrap_or(0)
        }
    }

    /// Stop working on the experiment without saving.
    pub fn exit(&mut self) -> Result<()> {
        self.require_open()?;
        self.state = LifecycleState::Exited;
        Ok(())
    }

    // ---- Accessors ----

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the experiment is opened or created (and not yet finished).
    pub fn is_open(&self) -> bool {
        matches!(self.state, LifecycleState::Opened | LifecycleState::Created)
    }

    pub fn has_read(&self) -> bool {
        self.has_read
    }

    pub fn experiment_type(&self) -> ExperimentType {
        self.envelope.experiment_type
    }

    /// Path of the backing save file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.envelope.name()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn wires(&self) -> &WireSet {
        &self.wires
    }

    pub fn grid(&self) -> GridFrame {
        self.grid
    }

    pub fn simulation_speed(&self) -> f64 {
        self.simulation_speed
    }

    // ---- Metadata ----

    /// Rename the experiment.
    pub fn entitle(&mut self, name: &str) -> Result<()> {
        self.require_open()?;
        self.envelope.set_name(name);
        Ok(())
    }

    /// Adjust the camera. `None` leaves a value unchanged.
    pub fn observe(
        &mut self,
        vision_center: Option<[f64; 3]>,
        distance: Option<f64>,
        target_rotation: Option<[f64; 3]>,
    ) -> Result<()> {
        self.require_open()?;
        if let Some(center) = vision_center {
            self.camera.look_at(center);
        }
        if let Some(distance) = distance {
            self.camera.set_distance(distance);
        }
        if let Some(rotation) = target_rotation {
            self.camera.set_target_rotation(rotation);
        }
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.require_open()?;
        self.envelope.paused = paused;
        self.envelope.experiment.paused = paused;
        Ok(())
    }

    pub fn set_simulation_speed(&mut self, speed: f64) -> Result<()> {
        self.require_open()?;
        if speed.is_nan() || speed <= 0.0 {
            return Err(ExperimentError::InvalidValue(format!("simulation speed {}", speed)));
        }
        self.simulation_speed = speed;
        Ok(())
    }

    /// Edit the published title and introduction.
    ///
    /// The introduction is stored one line per entry. With `append`, its
    /// lines are added after the existing description instead of replacing it.
    pub fn edit_publish_info(&mut self, title: Option<&str>, introduction: Option<&str>, append: bool) -> Result<()> {
        self.require_open()?;
        let summary = self.envelope.summary_mut();
        if let Some(title) = title {
            summary.subject = Some(title.to_string());
        }
        if let Some(introduction) = introduction {
            let lines = introduction.split('\n').map(str::to_string);
            match (&mut summary.description, append) {
                (Some(existing), true) => existing.extend(lines),
                (description, _) => *description = Some(lines.collect()),
            }
        }
        Ok(())
    }

    /// Add tags, skipping ones already present.
    pub fn add_tags<I, T>(&mut self, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.require_open()?;
        let summary = self.envelope.summary_mut();
        for tag in tags {
            let tag = tag.into();
            if !summary.tags.contains(&tag) {
                summary.tags.push(tag);
            }
        }
        Ok(())
    }

    // ---- Grid ----

    /// Interpret placement and lookup coordinates as grid cells.
    pub fn set_grid_mode(&mut self, enabled: bool) -> Result<()> {
        self.require_open()?;
        self.grid.enabled = enabled;
        Ok(())
    }

    /// Move the world position of grid cell (0, 0, 0).
    pub fn set_grid_origin(&mut self, origin: Position) -> Result<()> {
        self.require_open()?;
        if !origin.is_finite() {
            return Err(ExperimentError::InvalidValue(format!("grid origin {}", origin)));
        }
        self.grid.origin = Position::new(origin.x, origin.y, origin.z);
        Ok(())
    }

    // ---- Elements ----

    /// Place a new element with its default rotation.
    ///
    /// `coords` are grid cells in grid mode and world units otherwise.
    pub fn place(&mut self, kind: ElementKind, coords: Position) -> Result<&Element> {
        self.place_rotated(kind, coords, kind.default_rotation())
    }

    pub fn place_rotated(&mut self, kind: ElementKind, coords: Position, rotation: Rotation) -> Result<&Element> {
        self.require_open()?;
        if kind.experiment_type() != self.experiment_type() {
            return Err(ExperimentError::TypeMismatch);
        }
        if !coords.is_finite() {
            return Err(ExperimentError::InvalidValue(format!("coordinates {}", coords)));
        }
        if !rotation.is_finite() {
            return Err(ExperimentError::InvalidValue(format!("rotation {:?}", rotation)));
        }
        let world = self.grid.resolve(coords, kind.footprint());
        let mut element = Element::new(kind, world);
        element.set_rotation(rotation);
        element.placed_in_grid = self.grid.enabled;
        self.registry.insert(element)
    }

    /// Insert a prepared element, keeping its identifier.
    pub(crate) fn insert_element(&mut self, element: Element) -> Result<&Element> {
        self.require_open()?;
        if element.kind().experiment_type() != self.experiment_type() {
            return Err(ExperimentError::TypeMismatch);
        }
        self.registry.insert(element)
    }

    pub fn element(&self, id: &ElementId) -> Result<&Element> {
        self.registry.lookup_by_identifier(id)
    }

    pub fn element_mut(&mut self, id: &ElementId) -> Result<&mut Element> {
        self.require_open()?;
        self.registry.get_mut(id)
    }

    /// Element at `coords`, read as grid cells in grid mode.
    pub fn element_at(&self, coords: Position) -> Result<&Element> {
        if self.grid.enabled {
            self.element_at_grid(coords)
        } else {
            self.registry.lookup_by_position(coords)
        }
    }

    /// Element at grid cell `coords`, trying the small pitch then the big one.
    pub fn element_at_grid(&self, coords: Position) -> Result<&Element> {
        let small = self.grid.resolve_in(coords, Footprint::Small, true);
        if let Ok(element) = self.registry.lookup_by_position(small) {
            return Ok(element);
        }
        let big = self.grid.resolve_in(coords, Footprint::Big, true);
        self.registry.lookup_by_position(big).map_err(|_| {
            ExperimentError::NotFound(format!("element at grid cell {}", coords))
        })
    }

    /// Remove an element and every wire attached to it.
    pub fn remove_element(&mut self, id: &ElementId) -> Result<Element> {
        self.require_open()?;
        let element = self.registry.remove(id)?;
        let removed = self.wires.remove_touching(id);
        log::debug!("Removed element {} and {} wires", id, removed);
        Ok(element)
    }

    pub fn count_elements(&self) -> usize {
        self.registry.len()
    }

    /// Remove all elements, and with them all wires.
    pub fn clear_elements(&mut self) -> Result<()> {
        self.require_open()?;
        self.registry.clear();
        self.wires.clear();
        Ok(())
    }

    // ---- Wires ----

    /// Connect two pins. Returns `false` if the wire already existed.
    pub fn connect(&mut self, source: PinRef, target: PinRef, color: WireColor) -> Result<bool> {
        self.require_open()?;
        if !self.experiment_type().has_wires() {
            return Err(ExperimentError::TypeMismatch);
        }
        self.wires.connect(&self.registry, source, target, color)
    }

    pub fn disconnect(&mut self, source: &PinRef, target: &PinRef, color: WireColor) -> Result<Wire> {
        self.require_open()?;
        self.wires.disconnect(source, target, color)
    }

    pub fn count_wires(&self) -> usize {
        self.wires.len()
    }

    pub fn clear_wires(&mut self) -> Result<()> {
        self.require_open()?;
        self.wires.clear();
        Ok(())
    }
}
