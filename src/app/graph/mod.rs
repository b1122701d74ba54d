mod interaction;
mod orbit;
mod sphere;
