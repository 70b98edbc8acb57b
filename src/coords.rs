
use glam::Vec3;

/// Geodetic coordinates in degrees, with the +z axis as the north pole.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatLng {
    pub lat: f32,
    pub lng: f32,
}

impl LatLng {
    pub const fn new(lat: f32, lng: f32) -> Self {
        Self { lat, lng }
    }

    pub fn from_vector(v: Vec3) -> Self {
        Self {
            lat: v.z.atan2((v.x * v.x + v.y * v.y).sqrt()).to_degrees(),
            lng: v.y.atan2(v.x).to_degrees(),
        }
    }

    pub fn to_vector(self) -> Vec3 {
        let lat = self.lat.to_radians();
        let lng = self.lng.to_radians();

        Vec3::new(lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin())
    }
}

impl From<Vec3> for LatLng {
    fn from(v: Vec3) -> Self {
        Self::from_vector(v)
    }
}
