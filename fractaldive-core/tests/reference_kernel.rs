//! End-to-end checks of the CPU reference kernel.

use fractaldive_core::{
    escape_time, plane_point, render_reference, shade_pixel, KernelParams, Variant,
    INTERIOR_COLOR,
};

fn scenario() -> KernelParams {
    KernelParams {
        center: (-0.5, 0.0),
        zoom: 1.0,
        variant: Variant::Mandelbrot,
        max_iterations: 2000,
        resolution: (900, 700),
    }
}

#[test]
fn image_center_is_interior_with_interior_color() {
    let params = scenario();
    let point = plane_point(&params, 450, 350);
    assert_eq!(point, (-0.5, 0.0));

    let result = escape_time(params.variant, point, params.max_iterations);
    assert!(!result.escaped);
    assert_eq!(result.iterations, 2000);

    assert_eq!(shade_pixel(&params, 450, 350), INTERIOR_COLOR);
}

#[test]
fn identical_inputs_give_bit_identical_images() {
    let params = KernelParams {
        resolution: (96, 64),
        max_iterations: 300,
        ..scenario()
    };

    let first = render_reference(&params);
    let second = render_reference(&params);

    let bits = |img: &[[f32; 4]]| -> Vec<u32> {
        img.iter().flat_map(|px| px.iter().map(|c| c.to_bits())).collect()
    };
    assert_eq!(bits(&first), bits(&second));
}

#[test]
fn every_variant_produces_both_interior_and_exterior_pixels() {
    for variant in Variant::ALL {
        let params = KernelParams {
            center: (-0.25, 0.0),
            zoom: 1.5,
            variant,
            max_iterations: 200,
            resolution: (64, 48),
        };
        let image = render_reference(&params);
        let interior = image.iter().filter(|px| **px == INTERIOR_COLOR).count();
        assert!(interior > 0, "{variant}: no interior pixels");
        assert!(interior < image.len(), "{variant}: no exterior pixels");
    }
}

#[test]
fn corner_pixels_escape_at_default_view() {
    let params = scenario();
    let corner = plane_point(&params, 0, 0);
    let result = escape_time(params.variant, corner, params.max_iterations);
    assert!(result.escaped, "corner {corner:?} should be outside the set");
}
