#![allow(dead_code)]

pub fn close(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (*x - *y).abs() < 1e-5)
}

pub fn close_tol(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() < tol
}
