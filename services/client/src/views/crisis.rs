//! services/client/src/views/crisis.rs
//!
//! Static crisis resources. Needs no session and opens no subscription.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrisisResource {
    pub name: &'static str,
    pub contact: &'static str,
    pub description: &'static str,
    pub available: &'static str,
}

pub const CRISIS_RESOURCES: [CrisisResource; 5] = [
    CrisisResource {
        name: "National Suicide Prevention Lifeline",
        contact: "988",
        description: "24/7 crisis support and suicide prevention",
        available: "24/7",
    },
    CrisisResource {
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
        description: "Free, 24/7 crisis support via text message",
        available: "24/7",
    },
    CrisisResource {
        name: "SAMHSA National Helpline",
        contact: "1-800-662-4357",
        description: "Treatment referral and information service",
        available: "24/7",
    },
    CrisisResource {
        name: "National Domestic Violence Hotline",
        contact: "1-800-799-7233",
        description: "Support for domestic violence survivors",
        available: "24/7",
    },
    CrisisResource {
        name: "Trans Lifeline",
        contact: "877-565-8860",
        description: "Crisis support for transgender individuals",
        available: "24/7",
    },
];

pub const EMERGENCY_STEPS: [&str; 5] = [
    "If you're in immediate danger, call 911",
    "Reach out to a trusted friend or family member",
    "Contact one of the crisis hotlines below",
    "Go to your nearest emergency room",
    "Use a crisis chat service online",
];
