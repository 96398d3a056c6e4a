//! Classification of archive members by path

use std::fmt;

/// The directory directly under an archive's root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// Record tables and other stage data
    Dat,
    /// Stage and object collision meshes
    Dzb,
    /// Room collision
    Kcl,
    /// Room archives
    Rarc,
    /// Object archives
    Oarc,
    Other(String),
}

impl Category {
    pub fn from_name(name: &str) -> Self {
        match name {
            "dat" => Category::Dat,
            "dzb" => Category::Dzb,
            "kcl" => Category::Kcl,
            "rarc" => Category::Rarc,
            "oarc" => Category::Oarc,
            other => Category::Other(other.to_owned()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Category::Dat => "dat",
            Category::Dzb => "dzb",
            Category::Kcl => "kcl",
            Category::Rarc => "rarc",
            Category::Oarc => "oarc",
            Category::Other(name) => name,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a member holds, judging by its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    RecordTable,
    Geometry,
    Archive,
    Other,
}

impl MemberKind {
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".plc") {
            MemberKind::RecordTable
        } else if name.ends_with(".dzb") || name.ends_with(".kcl") {
            MemberKind::Geometry
        } else if name.ends_with(".arc") || name.ends_with(".arc.LZ") {
            MemberKind::Archive
        } else {
            MemberKind::Other
        }
    }
}

/// A member path split into the parts traversal cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member<'a> {
    pub path: &'a str,

    /// Second segment of the path, `None` for members directly under the root
    pub category: Option<Category>,

    /// Last segment of the path
    pub file_name: &'a str,

    pub kind: MemberKind,
}

impl<'a> Member<'a> {
    pub fn parse(path: &'a str) -> Self {
        let segments = path.split('/').collect::<Vec<_>>();
        let file_name = segments.last().copied().unwrap_or_default();
        let category = if segments.len() > 2 {
            segments.get(1).map(|name| Category::from_name(name))
        } else {
            None
        };

        Self {
            path,
            category,
            file_name,
            kind: MemberKind::from_file_name(file_name),
        }
    }

    /// Whether the member sits under one of the given category names
    pub fn in_category(&self, names: &[String]) -> bool {
        self.category
            .as_ref()
            .is_some_and(|category| names.iter().any(|name| name == category.name()))
    }

    /// File name without its archive extension, `F000_r01` for `F000_r01.arc.LZ`
    pub fn stem(&self) -> &'a str {
        let name = self.file_name;
        name.strip_suffix(".arc.LZ")
            .or_else(|| name.strip_suffix(".arc"))
            .unwrap_or(name)
    }

    /// Room number taken from the two characters before the archive extension
    pub fn room_id(&self) -> Option<u32> {
        let stem = self.stem();
        stem.get(stem.len().checked_sub(2)?..)?.parse().ok()
    }
}
