/// Placement of an image scaled to cover a surface, centered, overflow cropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// `scale = max(surface_w / image_w, surface_h / image_h)`, centered on the surface.
/// Returns `None` when either rectangle is degenerate.
pub fn cover_fit(surface: (f32, f32), image: (u32, u32)) -> Option<CoverFit> {
    let (surface_w, surface_h) = surface;
    let (image_w, image_h) = (image.0 as f32, image.1 as f32);
    if surface_w <= 0.0 || surface_h <= 0.0 || image_w <= 0.0 || image_h <= 0.0 {
        return None;
    }
    let scale = (surface_w / image_w).max(surface_h / image_h);
    let width = image_w * scale;
    let height = image_h * scale;
    Some(CoverFit {
        scale,
        x: surface_w / 2.0 - width / 2.0,
        y: surface_h / 2.0 - height / 2.0,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_wide_surface_scales_by_width() {
        let fit = cover_fit((1920.0, 1080.0), (800, 800)).unwrap();
        assert!((fit.scale - 2.4).abs() < EPS);
        assert!((fit.x - 0.0).abs() < EPS);
        assert!((fit.y - (540.0 - 960.0)).abs() < EPS);
    }

    #[test]
    fn test_tall_surface_scales_by_height() {
        let fit = cover_fit((400.0, 900.0), (1600, 900)).unwrap();
        assert!((fit.scale - 1.0).abs() < EPS);
        assert!((fit.x - (200.0 - 800.0)).abs() < EPS);
        assert!((fit.y - 0.0).abs() < EPS);
    }

    #[test]
    fn test_always_covers_and_centers() {
        let surfaces = [(320.0, 240.0), (1280.0, 720.0), (390.0, 844.0), (3000.0, 10.0)];
        let images = [(640u32, 480u32), (1920, 1080), (1, 1000), (1000, 1)];
        for surface in surfaces {
            for image in images {
                let fit = cover_fit(surface, image).unwrap();
                assert!(fit.width + EPS >= surface.0);
                assert!(fit.height + EPS >= surface.1);
                assert!((fit.x - (surface.0 / 2.0 - fit.width / 2.0)).abs() < EPS);
                assert!((fit.y - (surface.1 / 2.0 - fit.height / 2.0)).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(cover_fit((0.0, 100.0), (10, 10)).is_none());
        assert!(cover_fit((100.0, 100.0), (0, 10)).is_none());
    }
}
