#![cfg(target_arch = "wasm32")]
//! Browser front-end. Rust owns the camera, the scene state and the WebAudio
//! graph; drawing is left to the page, which pulls packed instance data and the
//! view-projection matrix from [`PeriodicView`] every animation frame.

mod audio;
mod dom;

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use glam::{Vec2, Vec3};
use instant::Instant;
use periodic_core::{
    builtin_elements, camera_start_vec3, default_starfield, note_name, parse_elements_csv,
    parse_elements_json, spectral_color, spectral_data, symbol_for, Camera, ColorScheme,
    ControlsOptions, Element, ElementFilter, ElementInstance, ElementSequence, ElementState,
    InstanceSlots, OrbitControls, SceneGraph, SoundMode, ToneSettings, TonePlayer,
    VisualizationMode, Waveform, CLICK_SLOP_PX,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

use audio::WebAudioBackend;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("periodic-web starting");
    Ok(())
}

async fn load_dataset(base_url: &str) -> Result<Vec<Element>, JsValue> {
    match dom::fetch_text(&format!("{base_url}/elements.json")).await {
        Ok(text) => match parse_elements_json(&text) {
            Ok(elements) => return Ok(elements),
            Err(e) => log::warn!("[data] elements.json rejected: {e}"),
        },
        Err(e) => log::warn!("[data] {e}"),
    }
    match dom::fetch_text(&format!("{base_url}/elements.csv")).await {
        Ok(text) => match parse_elements_csv(&text) {
            Ok(elements) => return Ok(elements),
            Err(e) => log::warn!("[data] elements.csv rejected: {e}"),
        },
        Err(e) => log::warn!("[data] {e}"),
    }
    log::info!("[data] using built-in dataset");
    builtin_elements().map_err(|e| JsValue::from_str(&e.to_string()))
}

struct ViewState {
    canvas: web::HtmlCanvasElement,
    elements: Vec<Element>,
    filter: ElementFilter,
    controls: OrbitControls,
    scene: SceneGraph<InstanceSlots>,
    player: TonePlayer<WebAudioBackend>,
    sequence: ElementSequence,
    settings: ToneSettings,
    cursor: Vec2,
    last_frame: Instant,
    steps: Vec<u32>,
}

impl ViewState {
    fn viewport(&self) -> Vec2 {
        Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn pick(&self) -> Option<u32> {
        let vp = self.viewport();
        self.scene
            .pick(self.controls.camera(), self.cursor.x, self.cursor.y, vp.x, vp.y)
    }

    fn play_element(&mut self, atomic_number: u32) {
        if !self.settings.enabled {
            return;
        }
        let req = self.settings.request_for(atomic_number);
        if self.player.play(req).is_some() {
            log::info!(
                "[audio] {} ({}) -> {:.2} Hz",
                atomic_number,
                note_name(atomic_number),
                req.frequency_hz
            );
        }
    }

    fn select_and_play(&mut self, atomic_number: Option<u32>) {
        self.scene.select(atomic_number);
        if let Some(n) = self.scene.selected() {
            self.play_element(n);
        }
    }

    fn pointer_down(&mut self, pos: Vec2) {
        self.cursor = pos;
        // First gesture unlocks the AudioContext.
        self.player.resume();
        self.controls.pointer_down(pos.x, pos.y);
    }

    fn pointer_move(&mut self, pos: Vec2) {
        self.cursor = pos;
        self.controls.pointer_move(pos.x, pos.y);
        if !self.controls.is_dragging() {
            let hit = self.pick();
            if hit != self.scene.hovered() {
                self.scene.hover(hit);
            }
        }
    }

    fn pointer_up(&mut self, pos: Vec2) {
        self.cursor = pos;
        let was_drag = self.controls.drag_travel() > CLICK_SLOP_PX;
        let was_down = self.controls.is_dragging();
        self.controls.pointer_up();
        if was_down && !was_drag {
            let hit = self.pick();
            self.select_and_play(hit);
        }
    }

    fn apply_filter(&mut self, filter: ElementFilter) {
        let visible = filter.apply(&self.elements);
        let (mode, scheme) = (self.scene.mode(), self.scene.scheme());
        self.scene.populate(&visible, mode, scheme);
        log::info!(
            "[scene] filter leaves {} of {} element(s)",
            visible.len(),
            self.elements.len()
        );
        self.filter = filter;
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        let vp = self.viewport();
        self.controls.set_viewport(vp.x, vp.y);
        self.controls.update();
        self.player.poll();

        let mut steps = std::mem::take(&mut self.steps);
        steps.clear();
        self.sequence.tick(dt, &mut steps);
        for &n in &steps {
            self.play_element(n);
        }
        self.steps = steps;
        if self.sequence.is_playing() {
            self.scene.select(self.sequence.highlighted());
        }
    }
}

fn attach_listeners(state: &Rc<RefCell<ViewState>>) -> Result<(), JsValue> {
    let canvas = state.borrow().canvas.clone();
    let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let s = Rc::clone(state);
    let c = canvas.clone();
    let down = dom::listen(&canvas, "pointerdown", move |ev: web::PointerEvent| {
        let pos = dom::pointer_canvas_px(&ev, &c);
        let _ = c.set_pointer_capture(ev.pointer_id());
        s.borrow_mut().pointer_down(pos);
    })?;

    let s = Rc::clone(state);
    let c = canvas.clone();
    let moved = dom::listen(&canvas, "pointermove", move |ev: web::PointerEvent| {
        let pos = dom::pointer_canvas_px(&ev, &c);
        s.borrow_mut().pointer_move(pos);
    })?;

    let s = Rc::clone(state);
    let c = canvas.clone();
    let up = dom::listen(&canvas, "pointerup", move |ev: web::PointerEvent| {
        let pos = dom::pointer_canvas_px(&ev, &c);
        s.borrow_mut().pointer_up(pos);
    })?;

    let s = Rc::clone(state);
    let wheel = dom::listen(&canvas, "wheel", move |ev: web::WheelEvent| {
        ev.prevent_default();
        s.borrow_mut().controls.wheel(ev.delta_y() as f32);
    })?;

    let c = canvas.clone();
    let resize = dom::listen(&window, "resize", move |_: web::Event| {
        dom::sync_canvas_backing_size(&c);
    })?;

    let mut st = state.borrow_mut();
    for guard in [down, moved, up, wheel, resize] {
        st.controls.attach_listener(Box::new(guard));
    }
    log::info!("[controls] {} listener(s) attached", st.controls.listener_count());
    Ok(())
}

fn parse_arg<T: FromStr>(value: &str, what: &str) -> Result<T, JsValue> {
    value
        .parse()
        .map_err(|_| JsValue::from_str(&format!("unknown {what} '{value}'")))
}

/// Scene, camera and sound state bound to one canvas.
#[wasm_bindgen]
pub struct PeriodicView {
    state: Rc<RefCell<ViewState>>,
}

#[wasm_bindgen]
impl PeriodicView {
    /// Attach to `#canvas_id`, loading `elements.json` (or `elements.csv`)
    /// from `data_url`.
    pub async fn create(canvas_id: String, data_url: String) -> Result<PeriodicView, JsValue> {
        let document = web::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: web::HtmlCanvasElement = document
            .get_element_by_id(&canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{canvas_id}")))?
            .dyn_into()
            .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;
        dom::sync_canvas_backing_size(&canvas);

        let elements = load_dataset(&data_url).await?;
        let aspect = canvas.width().max(1) as f32 / canvas.height().max(1) as f32;
        let camera = Camera::new(camera_start_vec3(), Vec3::ZERO, aspect);
        let mut controls = OrbitControls::new(camera, ControlsOptions::default());
        controls.set_viewport(canvas.width() as f32, canvas.height() as f32);

        let mut scene = SceneGraph::new(InstanceSlots::new());
        scene.populate(&elements, VisualizationMode::Spiral, ColorScheme::Category);
        log::info!("[scene] {} element(s)", scene.len());

        let state = Rc::new(RefCell::new(ViewState {
            canvas,
            elements,
            filter: ElementFilter::default(),
            controls,
            scene,
            player: TonePlayer::from_backend(WebAudioBackend::open()),
            sequence: ElementSequence::new(),
            settings: ToneSettings::default(),
            cursor: Vec2::ZERO,
            last_frame: Instant::now(),
            steps: Vec::new(),
        }));
        attach_listeners(&state)?;
        Ok(PeriodicView { state })
    }

    /// Advance camera, audio cleanup and sequence playback. Call once per
    /// animation frame before drawing.
    pub fn frame(&self) {
        self.state.borrow_mut().frame();
    }

    /// Packed [`ElementInstance`]s: position xyz, scale, color rgba.
    pub fn instances(&self) -> js_sys::Float32Array {
        let packed: Vec<ElementInstance> = self.state.borrow().scene.resources().packed();
        js_sys::Float32Array::from(bytemuck::cast_slice::<ElementInstance, f32>(&packed))
    }

    pub fn instance_stride_floats(&self) -> u32 {
        (std::mem::size_of::<ElementInstance>() / std::mem::size_of::<f32>()) as u32
    }

    /// Star positions, xyz per star.
    pub fn stars(&self) -> js_sys::Float32Array {
        let stars = default_starfield();
        js_sys::Float32Array::from(bytemuck::cast_slice::<Vec3, f32>(&stars))
    }

    /// Column-major view-projection matrix.
    pub fn view_proj(&self) -> js_sys::Float32Array {
        let m = self.state.borrow().controls.camera().view_projection_matrix();
        js_sys::Float32Array::from(&m.to_cols_array()[..])
    }

    pub fn camera_eye(&self) -> js_sys::Float32Array {
        let eye = self.state.borrow().controls.camera().eye;
        js_sys::Float32Array::from(&eye.to_array()[..])
    }

    pub fn selected(&self) -> Option<u32> {
        self.state.borrow().scene.selected()
    }

    pub fn hovered(&self) -> Option<u32> {
        self.state.borrow().scene.hovered()
    }

    /// Select an element (or clear with `undefined`) and play its tone.
    pub fn select(&self, atomic_number: Option<u32>) {
        self.state.borrow_mut().select_and_play(atomic_number);
    }

    /// Element record as JSON, for the page's info panel.
    pub fn element_json(&self, atomic_number: u32) -> Option<String> {
        let st = self.state.borrow();
        let e = st.scene.element(atomic_number)?;
        serde_json::to_string(e).ok()
    }

    pub fn note_name(&self, atomic_number: u32) -> String {
        note_name(atomic_number)
    }

    /// Emission lines in nm; empty when the element has no table entry.
    pub fn spectral_lines(&self, atomic_number: u32) -> js_sys::Float32Array {
        let lines = symbol_for(atomic_number)
            .and_then(spectral_data)
            .map_or(&[][..], |d| d.lines_nm);
        js_sys::Float32Array::from(lines)
    }

    /// Approximate display color (`#rrggbb`) of a visible wavelength.
    pub fn spectral_color(&self, wavelength_nm: f32) -> String {
        spectral_color(wavelength_nm).to_string()
    }

    /// Show only elements matching `query` (name, symbol or category) and
    /// the given facets. Empty strings and `undefined` leave a facet unset.
    pub fn set_filter(
        &self,
        query: String,
        category: Option<String>,
        state: Option<String>,
        period: Option<u32>,
        group: Option<u32>,
    ) -> Result<(), JsValue> {
        let state = match state.as_deref() {
            None | Some("") => None,
            Some("solid") => Some(ElementState::Solid),
            Some("liquid") => Some(ElementState::Liquid),
            Some("gas") => Some(ElementState::Gas),
            Some("unknown") => Some(ElementState::Unknown),
            Some(other) => return Err(JsValue::from_str(&format!("unknown state '{other}'"))),
        };
        let filter = ElementFilter {
            query,
            category: category.filter(|c| !c.trim().is_empty()),
            state,
            period,
            group,
        };
        self.state.borrow_mut().apply_filter(filter);
        Ok(())
    }

    pub fn clear_filter(&self) {
        self.state.borrow_mut().apply_filter(ElementFilter::default());
    }

    pub fn visible_count(&self) -> u32 {
        self.state.borrow().scene.len() as u32
    }

    pub fn set_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: VisualizationMode = parse_arg(mode, "mode")?;
        self.state.borrow_mut().scene.set_mode(mode);
        Ok(())
    }

    pub fn mode(&self) -> String {
        self.state.borrow().scene.mode().as_str().to_string()
    }

    pub fn set_color_scheme(&self, scheme: &str) -> Result<(), JsValue> {
        let scheme: ColorScheme = parse_arg(scheme, "color scheme")?;
        self.state.borrow_mut().scene.set_scheme(scheme);
        Ok(())
    }

    pub fn color_scheme(&self) -> String {
        self.state.borrow().scene.scheme().as_str().to_string()
    }

    pub fn set_waveform(&self, waveform: &str) -> Result<(), JsValue> {
        let waveform: Waveform = parse_arg(waveform, "waveform")?;
        self.state.borrow_mut().settings.waveform = waveform;
        Ok(())
    }

    pub fn set_sound_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: SoundMode = parse_arg(mode, "sound mode")?;
        self.state.borrow_mut().settings.mode = mode;
        Ok(())
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        let mut st = self.state.borrow_mut();
        st.settings.enabled = enabled;
        if !enabled {
            st.player.stop_all();
        }
    }

    /// Master output level; per-tone peaks are unaffected.
    pub fn set_volume(&self, volume: f32) {
        self.state.borrow_mut().player.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.state.borrow().player.volume()
    }

    pub fn set_auto_rotate(&self, enabled: bool) {
        self.state.borrow_mut().controls.set_auto_rotate(enabled);
    }

    pub fn set_auto_rotate_speed(&self, speed: f32) {
        self.state.borrow_mut().controls.set_auto_rotate_speed(speed);
    }

    /// Step through the first visible elements, one per second.
    pub fn play_sequence(&self) {
        let mut st = self.state.borrow_mut();
        let numbers: Vec<u32> = st
            .elements
            .iter()
            .filter(|e| st.filter.matches(e))
            .map(|e| e.atomic_number)
            .collect();
        st.sequence.start(numbers);
    }

    pub fn stop_sequence(&self) {
        let mut st = self.state.borrow_mut();
        st.sequence.stop();
        st.scene.select(None);
    }

    pub fn is_sequence_playing(&self) -> bool {
        self.state.borrow().sequence.is_playing()
    }

    pub fn stop_all(&self) {
        let mut st = self.state.borrow_mut();
        st.sequence.stop();
        st.player.stop_all();
    }

    pub fn active_tones(&self) -> u32 {
        self.state.borrow().player.active_count() as u32
    }

    /// Detach listeners, silence audio and release every scene object.
    /// Safe to call more than once.
    pub fn dispose(&self) {
        let mut st = self.state.borrow_mut();
        st.sequence.stop();
        st.controls.dispose();
        st.player.close();
        let n = st.scene.clear();
        log::info!("[engine] disposed {} mesh(es)", n);
    }
}

impl Drop for PeriodicView {
    fn drop(&mut self) {
        self.dispose();
    }
}
