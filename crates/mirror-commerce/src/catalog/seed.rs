//! Demo catalog.
//!
//! Several entries exist to exercise the palindrome discount: "ABBA" appears
//! as a brand, inside a brand and inside a description, one title is
//! "level", and three descriptions contain "racecar", "deed" and "madam".

use tracing::{debug, info};

use super::product::NewProduct;
use crate::error::CommerceError;
use crate::store::ProductStore;

const IMAGE_BASE: &str = "https://images.unsplash.com";

/// (title, brand, description, price, unsplash photo id)
const DEMO_PRODUCTS: [(&str, &str, &str, f64, &str); 12] = [
    (
        "Auriculares ABBA Pro",
        "ABBA",
        "Auriculares inalámbricos de alta calidad con cancelación de ruido",
        199.99,
        "photo-1505740420928-5e560c06d30e",
    ),
    (
        "Smartphone Premium",
        "TechABBA",
        "Teléfono inteligente con cámara profesional y batería de larga duración",
        899.99,
        "photo-1511707171634-5f897ff02aa9",
    ),
    (
        "Laptop Gaming",
        "GamerPro",
        "Laptop para gaming con procesador ABBA-X y tarjeta gráfica dedicada",
        1299.99,
        "photo-1496181133206-80ce9b88a853",
    ),
    (
        "Teclado Mecánico",
        "KeyMaster",
        "Teclado mecánico RGB para gaming y productividad",
        149.99,
        "photo-1587829741301-dc798b83add3",
    ),
    (
        "Monitor 4K",
        "DisplayTech",
        "Monitor 4K de 27 pulgadas con tecnología HDR",
        399.99,
        "photo-1527443224154-c4a3942d3acf",
    ),
    (
        "Ratón Inalámbrico",
        "ClickMaster",
        "Ratón inalámbrico ergonómico con sensor de precisión",
        79.99,
        "photo-1527814050087-3793815479db",
    ),
    (
        "Webcam HD",
        "StreamPro",
        "Cámara web HD para videoconferencias y streaming",
        129.99,
        "photo-1587202372634-32705e3bf49c",
    ),
    (
        "Altavoces Bluetooth",
        "SoundWave",
        "Altavoces Bluetooth portátiles con sonido estéreo",
        89.99,
        "photo-1608043152269-423dbba4e7e1",
    ),
    (
        "level",
        "TestBrand",
        "Producto para testing de palíndromos con título level",
        49.99,
        "photo-1560472354-b33ff0c44a43",
    ),
    (
        "Tablet Pro",
        "TabletCorp",
        "Tablet profesional con stylus incluido y pantalla racecar ultra sensible",
        599.99,
        "photo-1561154464-82e9adf32764",
    ),
    (
        "Smartwatch",
        "WatchTech",
        "Reloj inteligente con monitor de salud y GPS integrado deed",
        299.99,
        "photo-1523275335684-37898b6baf30",
    ),
    (
        "Cargador Inalámbrico",
        "ChargePlus",
        "Base de carga inalámbrica rápida madam compatible con todos los dispositivos",
        39.99,
        "photo-1586953208448-b95a79798f07",
    ),
];

/// The demo products, in insertion order.
pub fn demo_catalog() -> Vec<NewProduct> {
    DEMO_PRODUCTS
        .iter()
        .map(|&(title, brand, description, price, photo)| {
            NewProduct::new(title, brand, price)
                .with_description(description)
                .with_image_url(format!("{IMAGE_BASE}/{photo}?w=400"))
        })
        .collect()
}

/// Insert the demo catalog when the store has no products.
///
/// Returns the number of products inserted (0 when the store was not empty).
pub fn seed_if_empty<S: ProductStore + ?Sized>(store: &S) -> Result<usize, CommerceError> {
    let existing = store.count()?;
    if existing > 0 {
        debug!(existing, "catalog already seeded");
        return Ok(0);
    }

    let products = demo_catalog();
    let inserted = products.len();
    for product in products {
        store.insert(product)?;
    }

    info!(inserted, "seeded demo catalog");
    Ok(inserted)
}
