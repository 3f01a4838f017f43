pub mod sphere_vis3d;
