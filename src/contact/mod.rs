//! Store contact details and contact-message identifiers.

use chrono::Utc;

use crate::models::{ContactDetails, ContactInfo, OpeningHours, SocialLink};

/// Published WhatsApp number, used when no admin number is configured.
pub const STORE_WHATSAPP: &str = "+57 300 123 4567";

pub fn contact_info() -> ContactInfo {
    ContactInfo {
        phone: "+57 300 123 4567",
        whatsapp: STORE_WHATSAPP,
        email: "hola@eternallove.co",
        address: "Calle 123 #45-67, Bogotá, Colombia",
        hours: OpeningHours {
            weekdays: "Lunes a Viernes: 8:00 AM - 6:00 PM",
            saturday: "Sábados: 9:00 AM - 4:00 PM",
            sunday: "Domingos: Cerrado",
        },
    }
}

pub fn social_links() -> Vec<SocialLink> {
    vec![
        SocialLink {
            platform: "WhatsApp",
            url: "https://wa.me/573001234567?text=Hola%20Eternal%20Love%2C%20me%20interesa%20conocer%20m%C3%A1s%20sobre%20sus%20productos%20personalizados",
            icon: "message-circle",
            color: "green",
            followers: Some("Contacto directo"),
        },
        SocialLink {
            platform: "Instagram",
            url: "https://instagram.com/eternallove_personalizados",
            icon: "instagram",
            color: "pink",
            followers: Some("2.5K seguidores"),
        },
        SocialLink {
            platform: "Facebook",
            url: "https://facebook.com/eternallove.personalizados",
            icon: "facebook",
            color: "blue",
            followers: Some("1.8K seguidores"),
        },
        SocialLink {
            platform: "TikTok",
            url: "https://tiktok.com/@eternallove_co",
            icon: "video",
            color: "black",
            followers: Some("950 seguidores"),
        },
        SocialLink {
            platform: "YouTube",
            url: "https://youtube.com/@EternalLovePersonalizados",
            icon: "youtube",
            color: "red",
            followers: Some("320 suscriptores"),
        },
    ]
}

pub fn contact_details() -> ContactDetails {
    ContactDetails {
        info: contact_info(),
        social_links: social_links(),
    }
}

/// `msg-<epoch millis>-<9 lowercase alphanumerics>`
pub fn generate_message_id() -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(9)
        .collect();
    format!("msg-{}-{}", Utc::now().timestamp_millis(), suffix)
}
