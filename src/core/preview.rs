//! A quick look at a parsed scene without a display window. One
//! primary ray per pixel is cast from a camera that frames the
//! scene's bounding sphere; hits are shaded with the scene lights
//! using a Lambert term and hard shadows.

// std
use std::io::Stdout;
use std::sync::{Mutex, PoisonError};
// others
use image::{Rgb, RgbImage};
use log::info;
use pbr::ProgressBar;
use rayon::prelude::*;
// rs_ray
use crate::core::common::radians;
use crate::core::common::Float;
use crate::core::geometry::{nrm_dot_vec3f, nrm_faceforward_vec3};
use crate::core::geometry::{Normal3f, Point3f, Ray, Vector3f};
use crate::core::interaction::RayHit;
use crate::core::light::LightSample;
use crate::core::scene::Scene;
use crate::core::spectrum::RGBSpectrum;

const FIELD_OF_VIEW: Float = 45.0;
const AMBIENT: Float = 0.05;
/// offset of shadow ray origins along the normal, relative to the
/// scene radius
const SHADOW_OFFSET: Float = 1.0e-6;

/// Pinhole camera on the +z side of the scene looking down -z.
#[derive(Debug, Copy, Clone)]
pub struct PreviewCamera {
    pub eye: Point3f,
    tan_half_fov: Float,
    width: u32,
    height: u32,
}

impl PreviewCamera {
    /// Frame a sphere so that it fills the shorter image side.
    pub fn framing(center: &Point3f, radius: Float, width: u32, height: u32) -> Self {
        let tan_half_fov: Float = radians(FIELD_OF_VIEW * 0.5).tan();
        let half_fov: Float = radians(FIELD_OF_VIEW * 0.5);
        let distance: Float = radius.max(Float::EPSILON) / half_fov.sin();
        PreviewCamera {
            eye: *center + Vector3f::new(0.0, 0.0, distance),
            tan_half_fov,
            width: width.max(1),
            height: height.max(1),
        }
    }
    /// Ray through the center of pixel `(x, y)`, row 0 at the top.
    pub fn generate_ray(&self, x: u32, y: u32) -> Ray {
        let w: Float = self.width as Float;
        let h: Float = self.height as Float;
        let short: Float = w.min(h);
        let sx: Float = (2.0 * (x as Float + 0.5) - w) / short;
        let sy: Float = (h - 2.0 * (y as Float + 0.5)) / short;
        let d: Vector3f = Vector3f::new(sx * self.tan_half_fov, sy * self.tan_half_fov, -1.0);
        Ray::new(self.eye, d.normalize())
    }
}

fn shade(scene: &Scene, ray: &Ray, hit: &RayHit, offset: Float) -> RGBSpectrum {
    // light the side facing the viewer
    let n: Normal3f = nrm_faceforward_vec3(&hit.n, &-ray.d);
    let origin: Point3f = hit.p + Vector3f::from(n) * offset;
    let mut l: RGBSpectrum = RGBSpectrum::new(AMBIENT);
    for light in &scene.lights {
        let sample: LightSample = light.contribution(&hit.p);
        if sample.li.is_black() {
            continue;
        }
        let cos_theta: Float = nrm_dot_vec3f(&n, &sample.wi);
        if cos_theta <= 0.0 {
            continue;
        }
        let mut shadow_ray: Ray = Ray::new(origin, sample.wi);
        shadow_ray.t_max = sample.distance;
        if !scene.intersect_p(&shadow_ray) {
            l += sample.li * cos_theta;
        }
    }
    l
}

/// Render `scene` into an 8-bit sRGB image, rows in parallel.
pub fn render_preview(scene: &Scene, width: u32, height: u32, progress: bool) -> RgbImage {
    let (center, radius) = scene.world_bound().bounding_sphere();
    let camera: PreviewCamera = PreviewCamera::framing(&center, radius, width, height);
    let offset: Float = SHADOW_OFFSET * radius.max(1.0);
    let mut image: RgbImage = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return image;
    }
    info!("Rendering {}x{} preview", width, height);
    let bar: Option<Mutex<ProgressBar<Stdout>>> = if progress {
        Some(Mutex::new(ProgressBar::new(height as u64)))
    } else {
        None
    };
    let row_len: usize = width as usize * 3;
    image
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let ray: Ray = camera.generate_ray(x, y as u32);
                let l: RGBSpectrum = match scene.intersect(&ray) {
                    Some(hit) => shade(scene, &ray, &hit, offset),
                    None => RGBSpectrum::default(),
                };
                let start: usize = x as usize * 3;
                row[start..start + 3].copy_from_slice(&l.to_srgb8());
            }
            if let Some(ref bar) = bar {
                bar.lock().unwrap_or_else(PoisonError::into_inner).inc();
            }
        });
    if let Some(bar) = bar {
        bar.into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .finish();
    }
    image
}

/// Sum of the 8-bit channels at `(x, y)`.
pub fn pixel_luminance(image: &RgbImage, x: u32, y: u32) -> u32 {
    let Rgb([r, g, b]) = *image.get_pixel(x, y);
    r as u32 + g as u32 + b as u32
}
