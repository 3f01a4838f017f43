use std::time::Instant;

use crate::simulation::collision::{resolve, resolve_direct};
use crate::simulation::octree::Octree;
use crate::simulation::params::CollisionParams;
use crate::simulation::states::{Body, NVec3, SphereSystem};

/// Helper to build a manual system of size `n`
///
/// Deterministic positions on a few interleaved sine curves, radii cycling
/// through 50..=100, spread so the density stays comparable across `n`
fn make_system(n: usize) -> SphereSystem {
    let spread = 150.0 * (n as f64).cbrt();
    let bodies = (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * spread,
                (i_f * 0.13).cos() * spread,
                (i_f * 0.07).sin() * spread,
            );
            Body::new(x, 50.0 + (i % 51) as f64)
        })
        .collect();
    SphereSystem::new(bodies)
}

/// Time one octree build + resolve and one direct pass over the same bodies
fn time_pass(n: usize, params: &CollisionParams) -> (f64, f64) {
    let template = make_system(n);

    let mut sys_tree = template.clone();
    let t0 = Instant::now();
    let tree = Octree::build(&sys_tree.bodies);
    resolve(&mut sys_tree.bodies, &tree, params);
    let tree_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let mut sys_direct = template;
    let t1 = Instant::now();
    resolve_direct(&mut sys_direct.bodies, params);
    let direct_ms = t1.elapsed().as_secs_f64() * 1000.0;

    (tree_ms, direct_ms)
}

/// Compare octree-pruned and direct collision passes for a few sizes
pub fn bench_collide() {
    let params = CollisionParams::default();
    let ns = [150, 300, 600, 1200, 2400, 4800];

    for n in ns {
        // Warm up
        time_pass(n, &params);

        let (tree_ms, direct_ms) = time_pass(n, &params);
        println!("N = {n:5}, octree = {tree_ms:10.4} ms, direct = {direct_ms:10.4} ms");
    }
}

/// Same comparison over a finer range of n
/// Paste output directly into a spreadsheet to graph
pub fn bench_collide_curve() {
    let params = CollisionParams::default();

    println!("N,octree_ms,direct_ms");

    for n in (100..=3000).step_by(100) {
        // Small n: average a few passes to smooth noise
        let passes = if n <= 1000 { 5 } else { 1 };

        let mut tree_total = 0.0;
        let mut direct_total = 0.0;
        for _ in 0..passes {
            let (tree_ms, direct_ms) = time_pass(n, &params);
            tree_total += tree_ms;
            direct_total += direct_ms;
        }

        println!("{},{:.6},{:.6}", n, tree_total / passes as f64, direct_total / passes as f64);
    }
}
