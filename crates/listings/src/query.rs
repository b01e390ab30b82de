use shared::domain::Property;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    /// Case-insensitive match against name, address and type.
    pub text: Option<String>,
    pub kind: Option<String>,
    pub min_rating: Option<f32>,
}

impl ListingQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.normalized_text().is_none() && self.kind.is_none() && self.min_rating.is_none()
    }

    fn normalized_text(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, property: &Property) -> bool {
        if let Some(needle) = self.normalized_text() {
            let hit = [&property.name, &property.address, &property.kind]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(kind) = &self.kind {
            if !property.kind.eq_ignore_ascii_case(kind) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if property.rating < min_rating {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&'a self, properties: &'a [Property]) -> impl Iterator<Item = &'a Property> {
        properties.iter().filter(move |property| self.matches(property))
    }
}

/// Headline for a list of results. An empty result is a state with its own
/// message, not a blank area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSummary {
    Found(usize),
    Empty { message: String },
}

impl ListSummary {
    pub fn for_results(query: &ListingQuery, count: usize) -> Self {
        if count > 0 {
            return ListSummary::Found(count);
        }
        let message = match query.normalized_text() {
            Some(_) => format!(
                "No properties match \"{}\"",
                query.text.as_deref().unwrap_or_default().trim()
            ),
            None if query.is_unfiltered() => "No properties available".to_string(),
            None => "No properties match the current filters".to_string(),
        };
        ListSummary::Empty { message }
    }

    pub fn headline(&self) -> String {
        match self {
            ListSummary::Found(1) => "1 property found".to_string(),
            ListSummary::Found(count) => format!("{count} properties found"),
            ListSummary::Empty { message } => message.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ListSummary::Empty { .. })
    }
}
