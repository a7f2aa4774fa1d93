//! The profile snapshot: static biographical and project data
//!
//! The built-in snapshot is created once per process and never mutated. It is
//! rendered by the UI and serialized wholesale into every chat request as
//! system context.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub personal: Personal,
    pub stats: Vec<Stat>,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub awards: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personal {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub email: String,
    pub location: String,
    pub education: Vec<Education>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub year: String,
}

/// A headline number shown on the about page ("Projects: 4+")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub role: String,
    pub desc: String,
    pub tags: Vec<String>,
    pub highlights: Vec<String>,
}

static BUILTIN: OnceLock<Profile> = OnceLock::new();

impl Profile {
    /// The snapshot compiled into the binary.
    pub fn builtin() -> &'static Profile {
        BUILTIN.get_or_init(builtin_profile)
    }

    /// Load a replacement snapshot from a JSON file with the same shape.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let profile: Profile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse profile {}", path.display()))?;
        Ok(profile)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn project(&self, idx: usize) -> Option<&Project> {
        self.projects.get(idx)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_profile() -> Profile {
    Profile {
        personal: Personal {
            name: "Zhong Huiyu".to_string(),
            title: "Robotics & AI Algorithm Engineer".to_string(),
            subtitle: "Precision agriculture | Deep learning | Embedded systems".to_string(),
            email: "zhonghuiyu01@gmail.com".to_string(),
            location: "Shenzhen, Guangdong".to_string(),
            education: vec![
                Education {
                    school: "China Agricultural University".to_string(),
                    degree: "Mechatronic Engineering (M.Eng.)".to_string(),
                    year: "2023.09 - 2026.06".to_string(),
                },
                Education {
                    school: "Guangdong University of Technology".to_string(),
                    degree: "Mechatronic Engineering (B.Eng.)".to_string(),
                    year: "2019.09 - 2023.06".to_string(),
                },
            ],
        },
        stats: vec![
            Stat { label: "Projects".to_string(), value: "4+".to_string() },
            Stat { label: "Publications".to_string(), value: "3".to_string() },
            Stat { label: "Core skills".to_string(), value: "10+".to_string() },
            Stat { label: "Awards".to_string(), value: "5+".to_string() },
        ],
        skills: strings(&[
            "Python", "Pytorch", "ROS", "C++", "Solidworks",
            "TensorRT", "OpenCV", "YOLO", "Linux/Ubuntu", "Arduino/Teensy",
        ]),
        projects: vec![
            Project {
                title: "Opto-mechatronic laser weeding system".to_string(),
                role: "Lead developer | 2025.05 - present".to_string(),
                desc: "A contactless weeding system for precision agriculture. Integrates object \
                       detection, trajectory prediction and laser control on ROS."
                    .to_string(),
                tags: strings(&["ROS", "Laser control", "Arduino", "Solidworks"]),
                highlights: strings(&[
                    "Wrote the host and firmware control code, driving galvanometers over the XY2-100 protocol",
                    "Designed galvanometer mounting-error calibration and pincushion distortion compensation",
                    "Laser aiming error < 1 cm with system latency < 30 ms",
                    "EI journal paper in preparation (first author)",
                ]),
            },
            Project {
                title: "Vision-guided high-speed inter-row weeding robot".to_string(),
                role: "Algorithms & control | 2023.04 - 2025.06".to_string(),
                desc: "A high-speed weeding robot breaking a foreign monopoly. Extracts crop rows \
                       with YOLOv8 and the Hough transform to drive the cutting tools."
                    .to_string(),
                tags: strings(&["YOLOv8", "TensorRT", "Jetson", "Motion control"]),
                highlights: strings(&[
                    "Added template-line matching and multi-frame tracking for robustness",
                    "Deployed with TensorRT: 150% faster inference, 80% lower power draw",
                    "Operates at 12 km/h with 95% crop/weed detection accuracy",
                    "Built a semi-automatic labeling tool that sped up data preparation",
                ]),
            },
            Project {
                title: "Beef cattle behavior recognition with spatio-temporal action detection"
                    .to_string(),
                role: "Algorithm research | 2024.07 - 2025.05".to_string(),
                desc: "Real-time multi-animal behavior analysis with deep learning for intelligent \
                       livestock monitoring."
                    .to_string(),
                tags: strings(&["Deep learning", "Action recognition", "Transformer", "Paper"]),
                highlights: strings(&[
                    "Proposed EDST-Net, an end-to-end multi-cattle behavior detection framework",
                    "Designed cross-modal fusion and spatio-temporal deformable attention",
                    "13.6% higher accuracy with 65% less computation",
                    "Submitted to Computers and Electronics in Agriculture (CAS Q1 Top)",
                ]),
            },
        ],
        awards: strings(&[
            "National Advanced Graphics & Product Information Modeling Contest - First Prize (modeling)",
            "China International College Students' Innovation Competition, Beijing - First Prize",
            "Internet+ Competition, Guangdong - Gold Award",
            "Guangdong CAD Mechanical Design Competition - Second Prize",
            "China Agricultural University First-Class Scholarship (x3)",
        ]),
    }
}
