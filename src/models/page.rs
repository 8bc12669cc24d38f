/// The sortable catalog columns. The enum is the whitelist: a sort key that
/// does not parse into a variant never reaches SQL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    Title,
    Url,
    Source,
    Duration,
    UploadDate,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    /// Parses a query-string value. Accepts both the wire spelling
    /// (`uploadDate`) and the column spelling (`upload_date`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "url" => Some(Self::Url),
            "source" => Some(Self::Source),
            "duration" => Some(Self::Duration),
            "uploadDate" | "upload_date" => Some(Self::UploadDate),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    /// The column name as it appears in SQL.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Url => "url",
            Self::Source => "source",
            Self::Duration => "duration",
            Self::UploadDate => "upload_date",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// The sort direction for the catalog listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parses a query-string value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("ASC") {
            Some(Self::Asc)
        } else if value.eq_ignore_ascii_case("DESC") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    /// The direction keyword as it appears in SQL.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A validated page request. `page` is 1-based.
#[derive(Clone, Copy, Debug)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sort_by: SortColumn,
    pub direction: SortDirection,
}

impl PageRequest {
    /// The number of rows to skip: page 1 starts at row 0.
    ///
    /// Validation caps `page` and `size` at `i32::MAX`, which keeps this
    /// product inside `i64`.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            sort_by: SortColumn::default(),
            direction: SortDirection::default(),
        }
    }
}

/// A page of results plus the paging echo sent back to the caller.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub content: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_row_zero() {
        let request = PageRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.size, 10);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn offset_advances_by_page_size() {
        let request = PageRequest {
            page: 3,
            size: 25,
            ..PageRequest::default()
        };
        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn offset_stays_in_bounds_at_the_count_cap() {
        let request = PageRequest {
            page: i32::MAX as i64,
            size: i32::MAX as i64,
            ..PageRequest::default()
        };
        // (2^31 - 2) * (2^31 - 1); an overflow here would abort the test
        // build's checked arithmetic.
        assert_eq!(request.offset(), 4_611_686_011_984_936_962);
    }

    #[test]
    fn sort_column_accepts_both_spellings() {
        assert_eq!(SortColumn::parse("uploadDate"), Some(SortColumn::UploadDate));
        assert_eq!(SortColumn::parse("upload_date"), Some(SortColumn::UploadDate));
        assert_eq!(SortColumn::parse("title"), Some(SortColumn::Title));
        assert_eq!(SortColumn::parse("password"), None);
        assert_eq!(SortColumn::parse("id; DROP TABLE videos"), None);
    }

    #[test]
    fn sort_direction_is_case_insensitive() {
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("ASC"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("sideways"), None);
    }
}
