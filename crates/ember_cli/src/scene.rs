//! Scene construction: built-in scenes and the JSON scene format.
//!
//! The render core takes an ordered collection of primitives and knows
//! nothing about files; everything here lowers a description (built-in or
//! deserialized) into primitives plus shared material handles.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ember_math::Vec3;
use ember_render::{Camera, HittableList, Material, Sphere};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A camera pose as it appears in a scene file. Missing fields fall back to
/// the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDesc {
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub vup: [f32; 3],
    pub vfov: f32,
    pub aperture: f32,
    pub focus_distance: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            look_from: [0.0, 1.5, -4.0],
            look_at: [0.0, 1.0, 4.0],
            vup: [0.0, 1.0, 0.0],
            vfov: 35.0,
            aperture: 0.0,
            focus_distance: 8.0,
        }
    }
}

impl CameraDesc {
    fn build(&self) -> Camera {
        Camera::new()
            .with_position(vec3(self.look_from), vec3(self.look_at), vec3(self.vup))
            .with_lens(self.vfov, self.aperture, self.focus_distance)
    }
}

/// One material assignment in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian { albedo: [f32; 3] },
    Metal { albedo: [f32; 3], fuzz: f32 },
    Dielectric { ior: f32 },
}

impl MaterialDesc {
    fn build(&self) -> Material {
        match self {
            MaterialDesc::Lambertian { albedo } => Material::lambertian(vec3(*albedo)),
            MaterialDesc::Metal { albedo, fuzz } => Material::metal(vec3(*albedo), *fuzz),
            MaterialDesc::Dielectric { ior } => Material::dielectric(*ior),
        }
    }
}

/// One primitive in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereDesc {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: MaterialDesc,
}

/// Top-level scene file: a camera pose and an ordered list of spheres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub camera: CameraDesc,
    pub spheres: Vec<SphereDesc>,
}

impl SceneFile {
    /// Lower the description into primitives and a camera.
    pub fn build(&self) -> (HittableList, Camera) {
        let mut list = HittableList::new();
        for desc in &self.spheres {
            list.add(Box::new(Sphere::new(
                vec3(desc.center),
                desc.radius,
                Arc::new(desc.material.build()),
            )));
        }
        (list, self.camera.build())
    }
}

/// Load a scene description from a JSON file.
pub fn load_scene_file(path: &Path) -> Result<(HittableList, Camera)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let file: SceneFile = serde_json::from_str(&text).context("parsing scene JSON")?;
    Ok(file.build())
}

/// Ground sphere plus one sphere per material, lined up in front of the
/// camera.
pub fn trio_scene() -> (HittableList, Camera) {
    let mut list = HittableList::new();

    let ground = Arc::new(Material::lambertian(Vec3::new(0.5, 0.5, 0.5)));
    list.add(Box::new(Sphere::new(
        Vec3::new(0.0, -100.0, 4.0),
        100.0,
        ground,
    )));

    list.add(Box::new(Sphere::new(
        Vec3::new(-2.2, 1.0, 4.0),
        1.0,
        Arc::new(Material::lambertian(Vec3::new(0.4, 0.2, 0.1))),
    )));
    list.add(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 4.0),
        1.0,
        Arc::new(Material::dielectric(1.5)),
    )));
    list.add(Box::new(Sphere::new(
        Vec3::new(2.2, 1.0, 4.0),
        1.0,
        Arc::new(Material::metal(Vec3::new(0.7, 0.6, 0.5), 0.05)),
    )));

    let camera = Camera::new()
        .with_position(Vec3::new(0.0, 1.5, -4.0), Vec3::new(0.0, 1.0, 4.0), Vec3::Y)
        .with_lens(35.0, 0.0, 8.0);

    (list, camera)
}

/// Random sphere field around three large feature spheres. Deterministic for
/// a fixed seed.
pub fn demo_scene(seed: u64) -> (HittableList, Camera) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut list = HittableList::new();

    let ground = Arc::new(Material::lambertian(Vec3::new(0.5, 0.5, 0.5)));
    list.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        ground,
    )));

    // All glass spheres share one material handle.
    let glass = Arc::new(Material::dielectric(1.5));

    for a in -7..7 {
        for b in -7..7 {
            let choose = rng.gen::<f32>();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            // Keep clear of the large metal sphere.
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material = if choose < 0.8 {
                let albedo = random_color(&mut rng) * random_color(&mut rng);
                Arc::new(Material::lambertian(albedo))
            } else if choose < 0.95 {
                let albedo = Vec3::new(
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                );
                Arc::new(Material::metal(albedo, 0.5 * rng.gen::<f32>()))
            } else {
                glass.clone()
            };

            list.add(Box::new(Sphere::new(center, 0.2, material)));
        }
    }

    // Three large feature spheres
    list.add(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        glass.clone(),
    )));
    list.add(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::lambertian(Vec3::new(0.4, 0.2, 0.1))),
    )));
    list.add(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::metal(Vec3::new(0.7, 0.6, 0.5), 0.0)),
    )));

    let camera = Camera::new()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.2, 10.0);

    (list, camera)
}

fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

fn random_color(rng: &mut StdRng) -> Vec3 {
    Vec3::new(rng.gen(), rng.gen(), rng.gen())
}
