//! Scene graph of element meshes.
//!
//! [`SceneGraph`] owns one mesh per element through a [`SceneResources`]
//! implementation supplied by the front-end. Meshes are handed back to the
//! resources by value when removed, so every geometry/material/texture is
//! disposed exactly once: on repopulation, on [`SceneGraph::clear`], or when
//! the graph is dropped.

use crate::camera::Camera;
use crate::color::{color_for, Color, ColorScheme};
use crate::constants::{
    ELEMENT_BASE_SCALE, HOVER_SCALE, PICK_SPHERE_RADIUS, SELECTED_SCALE, STAR_COUNT, STAR_DEPTH,
    STAR_RADIUS, STAR_SEED,
};
use crate::element::Element;
use crate::layout::{position_for_element, VisualizationMode};
use crate::picking::{nearest_hit, screen_to_world_ray};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Derived per-element drawing data.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementVisual {
    pub atomic_number: u32,
    pub symbol: String,
    pub position: Vec3,
    pub color: Color,
    pub selected: bool,
    pub hovered: bool,
}

impl ElementVisual {
    pub fn new(element: &Element, mode: VisualizationMode, scheme: ColorScheme) -> Self {
        Self {
            atomic_number: element.atomic_number,
            symbol: element.symbol.clone(),
            position: position_for_element(element, mode),
            color: color_for(element, scheme),
            selected: false,
            hovered: false,
        }
    }

    pub fn scale(&self) -> f32 {
        if self.selected {
            SELECTED_SCALE
        } else if self.hovered {
            HOVER_SCALE
        } else {
            ELEMENT_BASE_SCALE
        }
    }

    pub fn instance(&self) -> ElementInstance {
        ElementInstance {
            position: self.position.to_array(),
            scale: self.scale(),
            color: self.color.to_rgba(),
        }
    }
}

pub fn build_visuals(
    elements: &[Element],
    mode: VisualizationMode,
    scheme: ColorScheme,
) -> Vec<ElementVisual> {
    elements
        .iter()
        .map(|e| ElementVisual::new(e, mode, scheme))
        .collect()
}

/// GPU instance layout shared by the WGSL shader and the web export.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ElementInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
}

/// Front-end owned GPU objects for element meshes.
pub trait SceneResources {
    type Mesh;

    fn create_mesh(&mut self, visual: &ElementVisual) -> Self::Mesh;
    /// Refresh color/scale/position of a live mesh.
    fn update_mesh(&mut self, mesh: &mut Self::Mesh, visual: &ElementVisual);
    /// Free the mesh's geometry, material and texture.
    fn dispose_mesh(&mut self, mesh: Self::Mesh);
}

/// CPU-side instance table; a mesh is a slot index. Used where the actual
/// drawing happens outside Rust.
#[derive(Default)]
pub struct InstanceSlots {
    slots: Vec<Option<ElementInstance>>,
    free: Vec<usize>,
}

impl InstanceSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Live instances packed in slot order.
    pub fn packed(&self) -> Vec<ElementInstance> {
        self.slots.iter().flatten().copied().collect()
    }
}

impl SceneResources for InstanceSlots {
    type Mesh = usize;

    fn create_mesh(&mut self, visual: &ElementVisual) -> usize {
        let inst = Some(visual.instance());
        match self.free.pop() {
            Some(i) => {
                self.slots[i] = inst;
                i
            }
            None => {
                self.slots.push(inst);
                self.slots.len() - 1
            }
        }
    }

    fn update_mesh(&mut self, mesh: &mut usize, visual: &ElementVisual) {
        if let Some(slot) = self.slots.get_mut(*mesh) {
            *slot = Some(visual.instance());
        }
    }

    fn dispose_mesh(&mut self, mesh: usize) {
        if let Some(slot) = self.slots.get_mut(mesh) {
            if slot.take().is_some() {
                self.free.push(mesh);
            }
        }
    }
}

struct SceneNode<M> {
    element: Element,
    visual: ElementVisual,
    mesh: M,
}

pub struct SceneGraph<R: SceneResources> {
    resources: R,
    nodes: Vec<SceneNode<R::Mesh>>,
    mode: VisualizationMode,
    scheme: ColorScheme,
    selected: Option<u32>,
    hovered: Option<u32>,
}

impl<R: SceneResources> SceneGraph<R> {
    pub fn new(resources: R) -> Self {
        Self {
            resources,
            nodes: Vec::new(),
            mode: VisualizationMode::default(),
            scheme: ColorScheme::default(),
            selected: None,
            hovered: None,
        }
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }

    pub fn mode(&self) -> VisualizationMode {
        self.mode
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn hovered(&self) -> Option<u32> {
        self.hovered
    }

    pub fn contains(&self, atomic_number: u32) -> bool {
        self.nodes
            .iter()
            .any(|n| n.element.atomic_number == atomic_number)
    }

    pub fn element(&self, atomic_number: u32) -> Option<&Element> {
        self.nodes
            .iter()
            .find(|n| n.element.atomic_number == atomic_number)
            .map(|n| &n.element)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().map(|n| &n.element)
    }

    pub fn visuals(&self) -> impl Iterator<Item = &ElementVisual> {
        self.nodes.iter().map(|n| &n.visual)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &R::Mesh> {
        self.nodes.iter().map(|n| &n.mesh)
    }

    pub fn instances(&self) -> Vec<ElementInstance> {
        self.nodes.iter().map(|n| n.visual.instance()).collect()
    }

    /// Replace the scene contents. Existing meshes are disposed before the
    /// new ones are created; selection survives if the element is still present.
    pub fn populate(
        &mut self,
        elements: &[Element],
        mode: VisualizationMode,
        scheme: ColorScheme,
    ) {
        let removed = self.clear_meshes();
        self.mode = mode;
        self.scheme = scheme;
        for element in elements {
            let mut visual = ElementVisual::new(element, mode, scheme);
            visual.selected = self.selected == Some(element.atomic_number);
            visual.hovered = self.hovered == Some(element.atomic_number);
            let mesh = self.resources.create_mesh(&visual);
            self.nodes.push(SceneNode {
                element: element.clone(),
                visual,
                mesh,
            });
        }
        if self.selected.is_some_and(|n| !self.contains(n)) {
            self.selected = None;
        }
        if self.hovered.is_some_and(|n| !self.contains(n)) {
            self.hovered = None;
        }
        log::info!(
            "[scene] populated {} element(s) in {} mode ({} disposed)",
            self.nodes.len(),
            mode.as_str(),
            removed
        );
    }

    /// Switch layout. Meshes are rebuilt so stale geometry never lingers.
    pub fn set_mode(&mut self, mode: VisualizationMode) {
        if mode == self.mode {
            return;
        }
        let elements: Vec<Element> = self.nodes.iter().map(|n| n.element.clone()).collect();
        self.populate(&elements, mode, self.scheme);
    }

    /// Recolor in place.
    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        if scheme == self.scheme {
            return;
        }
        self.scheme = scheme;
        for node in &mut self.nodes {
            node.visual.color = color_for(&node.element, scheme);
            self.resources.update_mesh(&mut node.mesh, &node.visual);
        }
        log::debug!("[scene] recolored by {}", scheme.as_str());
    }

    pub fn select(&mut self, atomic_number: Option<u32>) {
        let target = atomic_number.filter(|n| self.contains(*n));
        self.selected = target;
        for node in &mut self.nodes {
            let on = target == Some(node.element.atomic_number);
            if node.visual.selected != on {
                node.visual.selected = on;
                self.resources.update_mesh(&mut node.mesh, &node.visual);
            }
        }
    }

    pub fn hover(&mut self, atomic_number: Option<u32>) {
        let target = atomic_number.filter(|n| self.contains(*n));
        self.hovered = target;
        for node in &mut self.nodes {
            let on = target == Some(node.element.atomic_number);
            if node.visual.hovered != on {
                node.visual.hovered = on;
                self.resources.update_mesh(&mut node.mesh, &node.visual);
            }
        }
    }

    /// Atomic number of the element under a viewport pixel, if any.
    pub fn pick(
        &self,
        camera: &Camera,
        sx: f32,
        sy: f32,
        width: f32,
        height: f32,
    ) -> Option<u32> {
        let ray = screen_to_world_ray(camera, sx, sy, width, height)?;
        let spheres = self
            .nodes
            .iter()
            .map(|n| (n.visual.position, PICK_SPHERE_RADIUS * n.visual.scale()));
        nearest_hit(&ray, spheres).map(|(i, _)| self.nodes[i].element.atomic_number)
    }

    /// Dispose every mesh and empty the graph. Returns how many were disposed.
    pub fn clear(&mut self) -> usize {
        let n = self.clear_meshes();
        self.selected = None;
        self.hovered = None;
        n
    }

    fn clear_meshes(&mut self) -> usize {
        let n = self.nodes.len();
        for node in self.nodes.drain(..) {
            self.resources.dispose_mesh(node.mesh);
        }
        n
    }
}

impl<R: SceneResources> Drop for SceneGraph<R> {
    fn drop(&mut self) {
        let n = self.clear_meshes();
        if n > 0 {
            log::debug!("[scene] disposed {} mesh(es) on drop", n);
        }
    }
}

/// Deterministic star backdrop: points on a shell between `radius` and
/// `radius + depth` around the origin.
pub fn starfield(count: usize, radius: f32, depth: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let z: f32 = rng.gen_range(-1.0..=1.0);
            let a: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            let s = (1.0 - z * z).max(0.0).sqrt();
            let dist = radius + rng.gen::<f32>() * depth;
            Vec3::new(s * a.cos(), z, s * a.sin()) * dist
        })
        .collect()
}

pub fn default_starfield() -> Vec<Vec3> {
    starfield(STAR_COUNT, STAR_RADIUS, STAR_DEPTH, STAR_SEED)
}
