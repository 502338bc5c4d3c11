//! End-to-end bakes on synthetic meshes

use glam::{Vec2, Vec3, Vec4};
use translucency_core::{
    BakeSettings, BakeTarget, BakedTextureStore, Confidence, MaterialSettings, Mesh,
    TranslucencyBaker,
};

/// One triangle whose UVs cover the whole unit square
fn full_cover_triangle() -> Mesh {
    Mesh::new(
        vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(1.5, -0.5, 0.0),
            Vec3::new(-0.5, 1.5, 0.0),
        ],
        vec![Vec3::Z; 3],
        vec![Vec2::ZERO, Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0)],
        vec![[0, 1, 2]],
    )
}

/// Unit quad in the XY plane facing +Z, UVs covering the unit square
fn flat_quad() -> Mesh {
    Mesh::new(
        vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ],
        vec![Vec3::Z; 4],
        vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
        vec![[0, 1, 2], [0, 2, 3]],
    )
}

fn settings(resolution: i32) -> BakeSettings {
    BakeSettings {
        resolution,
        multisample: 1,
        material: MaterialSettings {
            transparency: 0.95,
            intensity: 1.0,
            density: 100.0,
            depth_cutout: 0.1,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_full_cover_triangle() {
    let baker = TranslucencyBaker::new(settings(32));
    let mut target = BakeTarget::new("cover", full_cover_triangle());
    let output = baker.bake(&mut target).unwrap();

    let position = &output.object_space.position;
    assert_eq!(position.resolution(), 32);
    assert!(position.texels().iter().all(|t| t.w == 1.0));
    assert_eq!(output.report.exact_texels, 32 * 32);

    for map in [&output.translucency.positive, &output.translucency.negative] {
        assert_eq!(map.count(Confidence::Empty), 0);
        assert_eq!(map.count(Confidence::Filled), 0);
    }
}

#[test]
fn test_flat_quad_favours_positive_hemisphere() {
    let baker = TranslucencyBaker::new(settings(64));
    let mut target = BakeTarget::new("quad", flat_quad());
    let output = baker.bake(&mut target).unwrap();
    let res = 64;

    let positive = &output.translucency.positive;
    let negative = &output.translucency.negative;
    assert_eq!(positive.count(Confidence::Exact), res * res);

    // Only the +Z channel carries emission, the negative side gets nothing
    for (p, n) in positive.texels().iter().zip(negative.texels()) {
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
        assert!(n.truncate().max_element() < 1e-6);
    }

    // Point-symmetric input gives point-symmetric output
    for y in 0..res {
        for x in 0..res {
            let a = positive.get(x, y).z;
            let b = positive.get(res - 1 - x, res - 1 - y).z;
            assert!((a - b).abs() < 1e-4, "({x}, {y}): {a} vs {b}");
        }
    }

    // Texels far from the border see the full kernel and saturate uniformly
    for y in 22..42 {
        for x in 22..42 {
            assert_eq!(positive.get(x, y), Vec4::new(0.0, 0.0, 1.0, 1.0));
        }
    }

    let factors = output.report.balance.factors;
    assert!(factors[0].is_finite());
    assert_eq!(factors[1], Vec3::ONE);
}

#[test]
fn test_bake_is_idempotent() {
    let baker = TranslucencyBaker::new(BakeSettings {
        multisample: 2,
        force_rebake: true,
        ..settings(32)
    });
    let mut first = BakeTarget::new("quad", flat_quad());
    let mut second = BakeTarget::new("quad", flat_quad());

    let a = baker.bake(&mut first).unwrap();
    let b = baker.bake(&mut second).unwrap();
    assert_eq!(a, b);

    // Rebaking the same target is identical too
    let c = baker.bake(&mut first).unwrap();
    assert_eq!(a.translucency, c.translucency);
}

#[test]
fn test_zero_area_uvs_do_not_fail() {
    let mesh = Mesh::new(
        vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        vec![Vec3::Z; 3],
        vec![Vec2::splat(0.5); 3],
        vec![[0, 1, 2]],
    );
    let mut target = BakeTarget::new("flat", mesh);
    let output = TranslucencyBaker::new(settings(32)).bake(&mut target).unwrap();

    assert_eq!(output.report.exact_texels, 0);
    assert_eq!(output.object_space.position.count(Confidence::Empty), 32 * 32);
    assert!(
        output
            .translucency
            .positive
            .texels()
            .iter()
            .all(|t| *t == Vec4::ZERO)
    );
}

#[test]
fn test_missing_uvs_is_data_error() {
    let mut mesh = flat_quad();
    mesh.uvs.clear();
    let mut target = BakeTarget::new("quad", mesh);
    let err = TranslucencyBaker::default().bake(&mut target).unwrap_err();
    assert!(err.is_data_error());
}

#[test]
fn test_persisted_maps_short_circuit_rasterization() {
    let dir = tempfile::tempdir().unwrap();
    let store = BakedTextureStore::new(dir.path());
    let baker = TranslucencyBaker::new(settings(32));

    let mut target = BakeTarget::new("quad", flat_quad());
    let first = baker.bake(&mut target).unwrap();
    store.save_object_space("quad", &first.object_space).unwrap();
    store.save_translucency("quad", &first.translucency).unwrap();

    let cached = store.load_object_space("quad").unwrap();
    let mut reloaded = BakeTarget::new("quad", flat_quad()).with_object_space(cached);
    let second = baker.bake(&mut reloaded).unwrap();

    assert!(!second.report.rasterized);
    assert_eq!(second.report.exact_texels, first.report.exact_texels);

    // A different resolution ignores the cache
    let mut stale = BakeTarget::new("quad", flat_quad())
        .with_object_space(store.load_object_space("quad").unwrap());
    let third = TranslucencyBaker::new(settings(48)).bake(&mut stale).unwrap();
    assert!(third.report.rasterized);
    assert_eq!(third.object_space.resolution(), 48);
}

#[test]
fn test_mismatched_cached_maps_rebake() {
    let dir = tempfile::tempdir().unwrap();
    let store = BakedTextureStore::new(dir.path());
    let baker = TranslucencyBaker::new(settings(32));

    let mut target = BakeTarget::new("quad", flat_quad());
    let first = baker.bake(&mut target).unwrap();
    let paths = store.save_object_space("quad", &first.object_space).unwrap();

    // Normal map no longer matches the position map
    image::RgbaImage::new(64, 64).save(&paths.normal).unwrap();

    let cached = store.load_object_space("quad").unwrap();
    assert!(cached.is_none());

    let mut reloaded = BakeTarget::new("quad", flat_quad()).with_object_space(cached);
    let second = baker.bake(&mut reloaded).unwrap();
    assert!(second.report.rasterized);
    assert_eq!(second.object_space, first.object_space);
    assert_eq!(second.translucency, first.translucency);
}
