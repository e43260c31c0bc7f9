//! Scene controller.

use crate::elements::{ElementRenderer, RenderEnv, RenderMode};
use crate::factory::ElementFactory;
use crate::preload::{MediaLoader, PreloadContext, Preloaded};
use crate::surface::Surface;
use futures_util::stream::{FuturesUnordered, StreamExt};
use hemp_core::objects::{ElementKind, LiveObject, ObjectId, SceneObject, Tracked};
use hemp_core::transform::{EngineSettings, HandleKind, TransformEngine};
use hemp_core::{
    Clock, HempConfig, Modifiers, PointerEvent, PropertyGroup, ResourceError, Result, SceneEvent, SystemClock,
    reconcile,
};
use kurbo::{Point, Size};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use web_time::Instant;

/// Host callback for scene events.
pub type Listener = Box<dyn FnMut(&SceneEvent)>;

/// Result of [`Hemp::set_objects`].
#[derive(Debug, Clone)]
pub struct SetObjectsOutcome {
    /// The merged scene, cleaned of runtime state.
    pub objects: Vec<SceneObject>,
    /// Every preload that failed. Failed objects render placeholders.
    pub errors: Vec<ResourceError>,
}

/// Owns the scene, renders it onto a surface and turns pointer input into
/// selection and transforms.
pub struct Hemp<S: Surface> {
    surface: S,
    config: HempConfig,
    engine: TransformEngine,
    factory: ElementFactory,
    env: RenderEnv,
    preload: PreloadContext,
    objects: Vec<LiveObject>,
    /// Per-object alpha masks, rebuilt lazily after every pointer-up.
    hit_masks: HashMap<ObjectId, Box<dyn Surface>>,
    listeners: Vec<Listener>,
    session_started: Option<Instant>,
    last_frame_rate: Option<f64>,
}

impl<S: Surface> Hemp<S> {
    pub fn new(surface: S, config: HempConfig, loader: Rc<dyn MediaLoader>) -> Result<Self> {
        Self::with_clock(surface, config, loader, Rc::new(SystemClock))
    }

    /// Like [`new`](Self::new) with an explicit clock for the media cache.
    pub fn with_clock(surface: S, config: HempConfig, loader: Rc<dyn MediaLoader>, clock: Rc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        if (surface.width(), surface.height()) != (config.width, config.height) {
            log::warn!(
                "surface is {}x{} but config says {}x{}",
                surface.width(),
                surface.height(),
                config.width,
                config.height
            );
        }
        let settings = EngineSettings {
            canvas: Size::new(f64::from(surface.width()), f64::from(surface.height())),
            ..EngineSettings::from(&config)
        };
        Ok(Self {
            engine: TransformEngine::new(settings),
            factory: ElementFactory::new(),
            env: RenderEnv::new(&config, clock),
            preload: PreloadContext::new(loader, &config),
            objects: Vec::new(),
            hit_masks: HashMap::new(),
            listeners: Vec::new(),
            session_started: None,
            last_frame_rate: None,
            surface,
            config,
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &HempConfig {
        &self.config
    }

    pub fn on_event(&mut self, listener: impl FnMut(&SceneEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the scene contents.
    ///
    /// Objects carrying an id from [`tracked`](Self::tracked) keep their
    /// identity, selection and load state. Resources are fetched
    /// concurrently; the scene is re-rendered as each one settles and once
    /// more at the end. Load failures are collected, not returned as errors.
    pub async fn set_objects<I, T>(&mut self, objects: I) -> Result<SetObjectsOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<Tracked>,
    {
        let incoming: Vec<Tracked> = objects.into_iter().map(Into::into).collect();
        let (merged, summary) = reconcile(std::mem::take(&mut self.objects), incoming);
        self.objects = merged;
        self.hit_masks.clear();
        if summary.dropped_selected {
            self.session_started = None;
        }

        let mut pending = FuturesUnordered::new();
        for live in &self.objects {
            let renderer = self.factory.get(live.object.element_type());
            if renderer.needs_preload(&mut self.env, live) {
                if let Some(task) = renderer.preload(live, &self.preload) {
                    pending.push(task);
                }
            }
        }
        if !pending.is_empty() {
            log::info!("preloading {} resources", pending.len());
        }

        let mut errors = Vec::new();
        while let Some((id, result)) = pending.next().await {
            match result {
                Ok(preloaded) => self.apply_preloaded(preloaded),
                Err(err) => {
                    log::warn!("{err}");
                    if let Some(live) = self.objects.iter_mut().find(|live| live.id() == id) {
                        live.runtime.error = Some(err.to_string());
                    }
                    errors.push(err);
                }
            }
            self.render()?;
        }
        self.render()?;

        Ok(SetObjectsOutcome {
            objects: self.get_objects(),
            errors,
        })
    }

    fn apply_preloaded(&mut self, preloaded: Preloaded) {
        match preloaded {
            Preloaded::Image { src, image } => {
                for live in &mut self.objects {
                    if matches!(&live.object.kind, ElementKind::Image(props) if props.src == src) {
                        live.runtime.error = None;
                    }
                }
                self.env.images.set(src, image);
            }
            Preloaded::Font { family } => {
                for live in &mut self.objects {
                    let uses_family = matches!(
                        &live.object.kind,
                        ElementKind::Text(props) if props.custom_font.as_ref().is_some_and(|f| f.family == family)
                    );
                    if uses_family {
                        live.runtime.font_loaded = true;
                        live.runtime.error = None;
                    }
                }
                self.env.loaded_fonts.insert(family);
            }
        }
    }

    /// Cleaned snapshots of every object, in z-order.
    pub fn get_objects(&self) -> Vec<SceneObject> {
        self.objects.iter().map(LiveObject::snapshot).collect()
    }

    /// Snapshots paired with identities, for feeding back into
    /// [`set_objects`](Self::set_objects).
    pub fn tracked(&self) -> Vec<Tracked> {
        self.objects.iter().map(LiveObject::tracked).collect()
    }

    pub fn objects(&self) -> &[LiveObject] {
        &self.objects
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        let objects = self.objects.iter().map(|live| live.object.to_json()).collect::<Result<_>>()?;
        Ok(serde_json::Value::Array(objects))
    }

    /// Redraw every object back to front, then the selection overlay.
    pub fn render(&mut self) -> Result<()> {
        self.surface.clear();
        for live in &self.objects {
            let renderer = self.factory.get(live.object.element_type());
            renderer.render(&mut self.env, &mut self.surface, live, RenderMode::Display)?;
        }
        if let Some(selected) = self.objects.iter().find(|live| live.is_selected()) {
            self.factory
                .transform()
                .render(&mut self.env, &mut self.surface, selected, RenderMode::Display)?;
        }
        Ok(())
    }

    pub fn selected(&self) -> Option<&LiveObject> {
        self.objects.iter().find(|live| live.is_selected())
    }

    fn selected_index(&self) -> Option<usize> {
        self.objects.iter().position(LiveObject::is_selected)
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|live| live.id() == id)
    }

    /// Select an object, deselecting any other. Returns false when the id is
    /// unknown or already selected.
    pub fn select(&mut self, id: ObjectId) -> Result<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let changed = self.select_index(index);
        if changed {
            self.render()?;
        }
        Ok(changed)
    }

    pub fn deselect(&mut self, id: ObjectId) -> Result<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let changed = self.deselect_index(index);
        if changed {
            self.render()?;
        }
        Ok(changed)
    }

    fn select_index(&mut self, index: usize) -> bool {
        if self.objects[index].is_selected() {
            return false;
        }
        if let Some(previous) = self.selected_index() {
            self.deselect_index(previous);
        }
        self.objects[index].runtime.selected = true;
        let snapshot = self.objects[index].snapshot();
        self.emit(SceneEvent::Select(snapshot));
        true
    }

    fn deselect_index(&mut self, index: usize) -> bool {
        let live = &mut self.objects[index];
        if !live.is_selected() {
            return false;
        }
        live.runtime.selected = false;
        live.runtime.session = None;
        let snapshot = live.snapshot();
        self.emit(SceneEvent::Deselect(snapshot));
        true
    }

    fn emit(&mut self, event: SceneEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        match event {
            PointerEvent::Down { position, .. } => self.pointer_down(position),
            PointerEvent::Move { position, modifiers } => self.pointer_move(position, modifiers),
            PointerEvent::Up { position, .. } => self.pointer_up(position),
        }
    }

    /// Grab a handle of the selected object, or select the topmost object
    /// under the pointer and start moving it. Empty canvas deselects.
    pub fn pointer_down(&mut self, point: Point) -> Result<()> {
        if !self.config.interactive {
            return Ok(());
        }
        if let Some(index) = self.selected_index() {
            if let Some(handle) = self.overlay_hit(index, point) {
                self.begin_session(index, handle, point);
                return Ok(());
            }
        }
        match self.hit_object(point)? {
            Some(index) => {
                self.select_index(index);
                let handle = self.overlay_hit(index, point).unwrap_or(HandleKind::Body);
                self.begin_session(index, handle, point);
            }
            None => {
                if let Some(index) = self.selected_index() {
                    self.deselect_index(index);
                }
            }
        }
        self.render()
    }

    pub fn pointer_move(&mut self, point: Point, modifiers: Modifiers) -> Result<()> {
        if !self.config.interactive {
            return Ok(());
        }
        let engine = self.engine;
        let Some(live) = self.objects.iter_mut().find(|live| live.runtime.session.is_some()) else {
            return Ok(());
        };
        let Some(session) = live.runtime.session.as_mut() else {
            return Ok(());
        };
        live.object.geometry = engine.update(session, point, modifiers);
        let snapshot = live.snapshot();
        self.render()?;
        self.emit(SceneEvent::Transform(snapshot));
        Ok(())
    }

    /// Finish the active session: floor the geometry, report the frame rate
    /// and drop cached hit masks.
    pub fn pointer_up(&mut self, _point: Point) -> Result<()> {
        if !self.config.interactive {
            return Ok(());
        }
        self.hit_masks.clear();
        let engine = self.engine;
        let Some(live) = self.objects.iter_mut().find(|live| live.runtime.session.is_some()) else {
            return Ok(());
        };
        let Some(session) = live.runtime.session.take() else {
            return Ok(());
        };
        live.object.geometry = engine.finish(&session, live.object.geometry);
        let snapshot = live.snapshot();

        let seconds = self
            .session_started
            .take()
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let rate = if seconds > 0.0 {
            f64::from(session.updates) / seconds
        } else {
            0.0
        };
        log::info!("transform finished: {} updates, {:.1} fps", session.updates, rate);
        self.last_frame_rate = Some(rate);

        self.render()?;
        self.emit(SceneEvent::FrameRate(rate));
        self.emit(SceneEvent::Transform(snapshot));
        Ok(())
    }

    /// Updates per second of the last finished transform.
    pub fn last_frame_rate(&self) -> Option<f64> {
        self.last_frame_rate
    }

    fn begin_session(&mut self, index: usize, handle: HandleKind, point: Point) {
        let live = &mut self.objects[index];
        if live.object.locked {
            log::debug!("object is locked; not starting a transform");
            return;
        }
        live.runtime.session = Some(self.engine.begin(live.object.geometry, handle, point));
        self.session_started = Some(Instant::now());
    }

    fn overlay_hit(&mut self, index: usize, point: Point) -> Option<HandleKind> {
        let geometry = self.objects[index].object.geometry;
        self.factory
            .transform()
            .hit_test(&self.env, &mut self.surface, &geometry, point)
    }

    /// Topmost visible object whose hit mask is opaque under `point`.
    fn hit_object(&mut self, point: Point) -> Result<Option<usize>> {
        let (x, y) = (point.x.floor() as i64, point.y.floor() as i64);
        for index in (0..self.objects.len()).rev() {
            let live = &self.objects[index];
            if !live.object.visible {
                continue;
            }
            let id = live.id();
            if !self.hit_masks.contains_key(&id) {
                let mut mask = self.surface.create_offscreen(self.surface.width(), self.surface.height());
                let renderer = self.factory.get(live.object.element_type());
                renderer.render(&mut self.env, mask.as_mut(), live, RenderMode::HitMask)?;
                self.hit_masks.insert(id, mask);
            }
            if self.hit_masks.get(&id).is_some_and(|mask| mask.alpha_at(x, y) > 0) {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Drop hit masks, decoded media and measured font metrics.
    pub fn clear_caches(&mut self) {
        self.hit_masks.clear();
        self.env.clear();
        for live in &mut self.objects {
            live.runtime.font_loaded = false;
        }
        self.factory.clear();
    }

    /// Editable properties per element type tag.
    pub fn property_registry(&self) -> BTreeMap<String, Vec<PropertyGroup>> {
        self.factory.property_registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preload::MemoryLoader;
    use crate::raster::PixelSurface;
    use hemp_core::objects::Geometry;
    use hemp_core::{ManualClock, transform::Corner};
    use kurbo::Rect;
    use std::cell::RefCell;

    fn hemp() -> Hemp<PixelSurface> {
        hemp_with_loader(MemoryLoader::new())
    }

    fn hemp_with_loader(loader: MemoryLoader) -> Hemp<PixelSurface> {
        let config = HempConfig::with_size(400, 300);
        Hemp::with_clock(PixelSurface::new(400, 300), config, Rc::new(loader), Rc::new(ManualClock::new(0))).unwrap()
    }

    fn red_rect() -> SceneObject {
        SceneObject::rectangle(Geometry::new(100.0, 100.0, 200.0, 100.0), "#FF0000")
    }

    fn record(hemp: &mut Hemp<PixelSurface>) -> Rc<RefCell<Vec<SceneEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        hemp.on_event(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn test_renders_red_rectangle_and_resizes_from_lr() {
        let mut hemp = hemp();
        pollster::block_on(hemp.set_objects(vec![red_rect()])).unwrap();
        assert_eq!(hemp.surface().pixel(100, 100), [255, 0, 0, 255]);
        assert_eq!(hemp.surface().pixel(2, 52), [255, 0, 0, 255]);
        assert_eq!(hemp.surface().alpha_at(100, 20), 0);

        // Click the body to select it.
        hemp.pointer_down(Point::new(100.0, 100.0)).unwrap();
        hemp.pointer_up(Point::new(100.0, 100.0)).unwrap();
        assert!(hemp.selected().is_some());

        hemp.pointer_down(Point::new(200.0, 150.0)).unwrap();
        let session = hemp.objects()[0].runtime.session.as_ref().unwrap();
        assert_eq!(session.handle, HandleKind::Corner(Corner::BottomRight));
        hemp.pointer_move(Point::new(250.0, 200.0), Modifiers::NONE).unwrap();
        hemp.pointer_up(Point::new(250.0, 200.0)).unwrap();

        let g = hemp.get_objects()[0].geometry;
        assert_eq!((g.width, g.height), (250.0, 150.0));
        assert_eq!(g.corners().ul, Point::new(0.0, 50.0));
        assert!(hemp.objects()[0].runtime.session.is_none());
    }

    #[test]
    fn test_click_selects_topmost_and_empty_deselects() {
        let mut hemp = hemp();
        let back = SceneObject::rectangle(Geometry::new(100.0, 100.0, 100.0, 100.0), "#0000ff");
        let front = SceneObject::ellipse(Geometry::new(120.0, 120.0, 100.0, 100.0), "#00ff00");
        pollster::block_on(hemp.set_objects(vec![back, front])).unwrap();
        let events = record(&mut hemp);

        hemp.pointer_down(Point::new(120.0, 120.0)).unwrap();
        hemp.pointer_up(Point::new(120.0, 120.0)).unwrap();
        assert_eq!(hemp.selected().map(LiveObject::id), Some(hemp.objects()[1].id()));

        // Outside the ellipse and its handles but inside the back rectangle.
        hemp.pointer_down(Point::new(65.0, 100.0)).unwrap();
        hemp.pointer_up(Point::new(65.0, 100.0)).unwrap();
        assert_eq!(hemp.selected().map(LiveObject::id), Some(hemp.objects()[0].id()));

        hemp.pointer_down(Point::new(390.0, 290.0)).unwrap();
        assert!(hemp.selected().is_none());

        let names: Vec<&str> = events.borrow().iter().map(SceneEvent::name).collect();
        assert_eq!(
            names,
            vec![
                "select",
                "framerate",
                "transform",
                "deselect",
                "select",
                "framerate",
                "transform",
                "deselect"
            ]
        );
    }

    #[test]
    fn test_move_emits_transform_and_frame_rate() {
        let mut hemp = hemp();
        pollster::block_on(hemp.set_objects(vec![red_rect()])).unwrap();
        let events = record(&mut hemp);

        hemp.pointer_down(Point::new(100.0, 100.0)).unwrap();
        hemp.pointer_move(Point::new(110.5, 120.5), Modifiers::NONE).unwrap();
        hemp.pointer_up(Point::new(110.5, 120.5)).unwrap();

        let g = hemp.get_objects()[0].geometry;
        assert_eq!((g.x, g.y), (110.0, 120.0));
        assert!(hemp.last_frame_rate().is_some());
        let events = events.borrow();
        assert!(matches!(events.last(), Some(SceneEvent::Transform(obj)) if obj.geometry.x == 110.0));
        assert!(events.iter().any(|e| matches!(e, SceneEvent::FrameRate(_))));
    }

    #[test]
    fn test_rotation_is_normalized_on_set_and_drag() {
        let mut hemp = hemp();
        let mut turned = red_rect();
        turned.geometry.rotation = 450.0;
        let mut back = SceneObject::rectangle(Geometry::new(300.0, 200.0, 40.0, 40.0), "#0000ff");
        back.geometry.rotation = -90.0;
        pollster::block_on(hemp.set_objects(vec![back, turned])).unwrap();
        let rotations: Vec<f64> = hemp.get_objects().iter().map(|o| o.geometry.rotation).collect();
        assert_eq!(rotations, vec![270.0, 90.0]);

        let events = record(&mut hemp);
        hemp.pointer_down(Point::new(100.0, 100.0)).unwrap();
        hemp.pointer_move(Point::new(110.0, 100.0), Modifiers::NONE).unwrap();
        let rotation = match events.borrow().last() {
            Some(SceneEvent::Transform(obj)) => obj.geometry.rotation,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(rotation, 90.0);
        hemp.pointer_up(Point::new(110.0, 100.0)).unwrap();
        assert_eq!(hemp.get_objects()[1].geometry.rotation, 90.0);
    }

    #[test]
    fn test_locked_object_selects_but_stays_put() {
        let mut hemp = hemp();
        let mut locked = red_rect();
        locked.locked = true;
        pollster::block_on(hemp.set_objects(vec![locked])).unwrap();

        hemp.pointer_down(Point::new(100.0, 100.0)).unwrap();
        hemp.pointer_move(Point::new(150.0, 150.0), Modifiers::NONE).unwrap();
        hemp.pointer_up(Point::new(150.0, 150.0)).unwrap();

        assert!(hemp.selected().is_some());
        assert_eq!(hemp.get_objects()[0].geometry, red_rect().geometry);
    }

    #[test]
    fn test_non_interactive_ignores_pointer() {
        let config = HempConfig {
            interactive: false,
            ..HempConfig::with_size(400, 300)
        };
        let mut hemp = Hemp::new(PixelSurface::new(400, 300), config, Rc::new(MemoryLoader::new())).unwrap();
        pollster::block_on(hemp.set_objects(vec![red_rect()])).unwrap();
        hemp.pointer_down(Point::new(100.0, 100.0)).unwrap();
        assert!(hemp.selected().is_none());
    }

    #[test]
    fn test_selection_survives_set_objects() {
        let mut hemp = hemp();
        pollster::block_on(hemp.set_objects(vec![red_rect()])).unwrap();
        let id = hemp.objects()[0].id();
        assert!(hemp.select(id).unwrap());
        assert!(!hemp.select(id).unwrap());

        let mut tracked = hemp.tracked();
        tracked[0].object.geometry.x = 150.0;
        tracked.insert(0, Tracked::from(SceneObject::ellipse(Geometry::default(), "#00ff00")));
        let outcome = pollster::block_on(hemp.set_objects(tracked)).unwrap();

        assert_eq!(outcome.objects.len(), 2);
        assert_eq!(hemp.objects()[1].id(), id);
        assert!(hemp.objects()[1].is_selected());
        assert_eq!(hemp.get_objects()[1].geometry.x, 150.0);

        // Dropping the selected object clears the selection.
        let only_new = vec![hemp.tracked()[0].clone()];
        pollster::block_on(hemp.set_objects(only_new)).unwrap();
        assert!(hemp.selected().is_none());
    }

    #[test]
    fn test_preload_images_and_collect_errors() {
        let mut source = PixelSurface::new(4, 4);
        source.fill_path(
            &kurbo::Shape::to_path(&Rect::new(0.0, 0.0, 4.0, 4.0), 0.1),
            peniko::Color::from_rgba8(0, 255, 0, 255),
        );
        let loader = MemoryLoader::new().with_image("ok.png", source.snapshot());
        let mut hemp = hemp_with_loader(loader);

        let outcome = pollster::block_on(hemp.set_objects(vec![
            SceneObject::image(Geometry::new(50.0, 50.0, 100.0, 100.0), "ok.png"),
            SceneObject::image(Geometry::new(300.0, 200.0, 100.0, 100.0), "missing.png"),
        ]))
        .unwrap();

        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(&outcome.errors[0], ResourceError::ImageLoad { url, .. } if url == "missing.png"));
        assert_eq!(hemp.surface().pixel(50, 50), [0, 255, 0, 255]);
        assert!(hemp.objects()[1].runtime.error.is_some());
        assert!(hemp.objects()[0].runtime.error.is_none());
        // Placeholder drawn for the failed one.
        assert_eq!(hemp.surface().alpha_at(255, 155), 255);
    }

    #[test]
    fn test_bad_color_fails_fast() {
        let mut hemp = hemp();
        let bad = SceneObject::rectangle(Geometry::new(100.0, 100.0, 100.0, 100.0), "#12");
        assert!(pollster::block_on(hemp.set_objects(vec![bad])).is_err());
    }

    #[test]
    fn test_get_objects_is_clean_json() {
        let mut hemp = hemp();
        pollster::block_on(hemp.set_objects(vec![red_rect()])).unwrap();
        let id = hemp.objects()[0].id();
        hemp.select(id).unwrap();
        let json = hemp.to_json().unwrap();
        let obj = json[0].as_object().unwrap();
        assert_eq!(obj["type"], "shape");
        assert!(!obj.contains_key("selected"));
        assert!(!obj.contains_key("id"));
    }
}
