mod audio;
mod render;

use glam::{Vec2, Vec3};
use instant::Instant;
use winit::event::{ElementState as ButtonState, MouseButton, MouseScrollDelta};
use winit::keyboard::{Key, NamedKey};
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use audio::CpalBackend;
use periodic_core::{
    builtin_elements, camera_start_vec3, default_starfield, load_elements, note_name,
    spectral_color, spectral_data, Camera, ColorScheme, ControlsOptions, Element, ElementFilter,
    ElementSequence, ElementState, OrbitControls, SceneGraph, ToneSettings, TonePlayer,
    VisualizationMode, CLICK_SLOP_PX, VOLUME_STEP,
};
use render::{GpuMeshes, GpuState};

struct App {
    elements: Vec<Element>,
    filter: ElementFilter,
    scene: SceneGraph<GpuMeshes>,
    controls: OrbitControls,
    player: TonePlayer<CpalBackend>,
    sequence: ElementSequence,
    settings: ToneSettings,
    cursor: Vec2,
    viewport: Vec2,
    last_frame: Instant,
    steps: Vec<u32>,
}

impl App {
    fn pick(&self) -> Option<u32> {
        self.scene.pick(
            self.controls.camera(),
            self.cursor.x,
            self.cursor.y,
            self.viewport.x,
            self.viewport.y,
        )
    }

    fn play_element(&mut self, atomic_number: u32) {
        if !self.settings.enabled {
            return;
        }
        let req = self.settings.request_for(atomic_number);
        if self.player.play(req).is_some() {
            log::info!(
                "[audio] {} ({}) -> {:.2} Hz [{}]",
                atomic_number,
                note_name(atomic_number),
                req.frequency_hz,
                self.settings.mode.as_str()
            );
        }
    }

    fn click(&mut self) {
        let hit = self.pick();
        self.scene.select(hit);
        if let Some(n) = hit {
            if let Some(e) = self.scene.element(n) {
                log::info!(
                    "[scene] selected {} {} ({}), mass {:.3}",
                    e.atomic_number,
                    e.name,
                    e.category,
                    e.atomic_mass
                );
                if let Some(d) = spectral_data(&e.symbol) {
                    log::info!(
                        "[scene] {} emission lines {:?} nm, dominant {} nm ({})",
                        e.symbol,
                        d.lines_nm,
                        d.dominant_wavelength_nm,
                        spectral_color(d.dominant_wavelength_nm)
                    );
                }
            }
            self.play_element(n);
        }
    }

    fn toggle_sequence(&mut self) {
        if self.sequence.is_playing() {
            self.sequence.stop();
            self.scene.select(None);
        } else {
            let numbers: Vec<u32> = self
                .elements
                .iter()
                .filter(|e| self.filter.matches(e))
                .map(|e| e.atomic_number)
                .collect();
            self.sequence.start(numbers);
        }
    }

    /// Cycle the state facet: all, solid, liquid, gas.
    fn cycle_state_filter(&mut self) {
        self.filter.state = match self.filter.state {
            None => Some(ElementState::Solid),
            Some(ElementState::Solid) => Some(ElementState::Liquid),
            Some(ElementState::Liquid) => Some(ElementState::Gas),
            Some(_) => None,
        };
        let visible = self.filter.apply(&self.elements);
        let (mode, scheme) = (self.scene.mode(), self.scene.scheme());
        self.scene.populate(&visible, mode, scheme);
        log::info!(
            "[scene] state filter {}: {} element(s)",
            self.filter.state.map_or("all", |s| s.as_str()),
            visible.len()
        );
    }

    fn handle_key(&mut self, key: &Key) {
        match key.as_ref() {
            Key::Character(c) => match c {
                "1" => self.scene.set_mode(VisualizationMode::Spiral),
                "2" => self.scene.set_mode(VisualizationMode::Table),
                "3" => self.scene.set_mode(VisualizationMode::Harmonic),
                "4" => self.scene.set_mode(VisualizationMode::Orbital),
                "c" | "C" => {
                    let next = self.scene.scheme().next();
                    self.scene.set_scheme(next);
                }
                "m" | "M" => {
                    self.settings.mode = self.settings.mode.toggled();
                    log::info!("[audio] sound mode {}", self.settings.mode.as_str());
                }
                "w" | "W" => {
                    self.settings.waveform = self.settings.waveform.next();
                    log::info!("[audio] waveform {}", self.settings.waveform.as_str());
                }
                "p" | "P" => self.toggle_sequence(),
                "f" | "F" => self.cycle_state_filter(),
                "s" | "S" => {
                    self.sequence.stop();
                    self.player.stop_all();
                }
                "t" | "T" => {
                    self.settings.enabled = !self.settings.enabled;
                    if !self.settings.enabled {
                        self.player.stop_all();
                    }
                }
                _ => {}
            },
            Key::Named(NamedKey::Space) => {
                let on = !self.controls.state().auto_rotate;
                self.controls.set_auto_rotate(on);
            }
            Key::Named(NamedKey::ArrowUp) => {
                self.player.set_volume(self.player.volume() + VOLUME_STEP);
            }
            Key::Named(NamedKey::ArrowDown) => {
                self.player.set_volume(self.player.volume() - VOLUME_STEP);
            }
            _ => {}
        }
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        self.controls.update();
        self.player.poll();

        self.steps.clear();
        self.sequence.tick(dt, &mut self.steps);
        let steps = std::mem::take(&mut self.steps);
        for &n in &steps {
            self.play_element(n);
        }
        self.steps = steps;
        if self.sequence.is_playing() {
            self.scene.select(self.sequence.highlighted());
        }
    }

    fn teardown(&mut self) {
        self.sequence.stop();
        self.controls.dispose();
        self.player.close();
        let n = self.scene.clear();
        log::info!("[engine] teardown released {} mesh(es)", n);
    }
}

fn read_feed(path: &str) -> anyhow::Result<Vec<Element>> {
    let text = std::fs::read_to_string(path)?;
    let elements = if path.ends_with(".csv") {
        load_elements(None, Some(&text))?
    } else {
        load_elements(Some(&text), None)?
    };
    Ok(elements)
}

fn load_dataset() -> anyhow::Result<Vec<Element>> {
    if let Some(path) = std::env::args().nth(1) {
        match read_feed(&path) {
            Ok(elements) => return Ok(elements),
            Err(e) => log::warn!("[data] {path}: {e}; using built-in dataset"),
        }
    }
    Ok(builtin_elements()?)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let elements = load_dataset()?;

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Periodic Harmonics (native)")
        .build(&event_loop)?;

    let stars = default_starfield();
    let mut state = pollster::block_on(GpuState::new(&window, &stars))?;

    let size = window.inner_size();
    let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
    let camera = Camera::new(camera_start_vec3(), Vec3::ZERO, aspect);
    let mut controls = OrbitControls::new(camera, ControlsOptions::default());
    controls.set_viewport(size.width as f32, size.height as f32);

    let mut scene = SceneGraph::new(state.meshes());
    scene.populate(&elements, VisualizationMode::Spiral, ColorScheme::Category);

    let mut app = App {
        elements,
        filter: ElementFilter::default(),
        scene,
        controls,
        player: TonePlayer::from_backend(CpalBackend::open()),
        sequence: ElementSequence::new(),
        settings: ToneSettings::default(),
        cursor: Vec2::ZERO,
        viewport: Vec2::new(size.width as f32, size.height as f32),
        last_frame: Instant::now(),
        steps: Vec::new(),
    };
    log::info!(
        "[engine] keys: 1-4 layout, C colors, M sound mode, W waveform, T sound on/off, \
         F state filter, Space auto-rotate, P sequence, S stop, Up/Down volume"
    );

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => {
                state.resize(size);
                app.viewport = Vec2::new(size.width as f32, size.height as f32);
                app.controls.set_viewport(app.viewport.x, app.viewport.y);
            }
            WindowEvent::CloseRequested => {
                app.teardown();
                log::debug!("[engine] {} gpu mesh(es) live", app.scene.resources().live());
                elwt.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                app.cursor = Vec2::new(position.x as f32, position.y as f32);
                app.controls.pointer_move(app.cursor.x, app.cursor.y);
                if !app.controls.is_dragging() {
                    let hit = app.pick();
                    if hit != app.scene.hovered() {
                        app.scene.hover(hit);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ButtonState::Pressed => {
                    app.player.resume();
                    app.controls.pointer_down(app.cursor.x, app.cursor.y);
                }
                ButtonState::Released => {
                    let was_drag = app.controls.drag_travel() > CLICK_SLOP_PX;
                    app.controls.pointer_up();
                    if !was_drag {
                        app.click();
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                // Positive wheel delta moves the camera out, matching DOM deltaY.
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => -y,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
                };
                app.controls.wheel(dy);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ButtonState::Pressed {
                    if event.logical_key == Key::Named(NamedKey::Escape) {
                        app.teardown();
                        elwt.exit();
                    } else {
                        app.handle_key(&event.logical_key);
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            app.frame();
            match state.render(app.controls.camera(), &app.scene) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            }
        }
        _ => {}
    })?;
    Ok(())
}
