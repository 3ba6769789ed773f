//! Movie catalog store.
//!
//! Movies are read-mostly: the API only ever lists and looks them up, so
//! the store exposes finds plus an insert used for seeding and tests.
//! Title, genre, and director lookups are case-insensitive.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use super::{StoreError, StoreResult};
use crate::models::{Director, Genre, Movie};

pub struct MovieStore {
    db_path: String,
}

impl MovieStore {
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS movies (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                genre_name TEXT NOT NULL,
                genre_description TEXT NOT NULL,
                director_name TEXT NOT NULL,
                director_bio TEXT NOT NULL,
                director_birth TEXT,
                director_death TEXT,
                actors TEXT NOT NULL,
                image_path TEXT,
                featured INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn conn(&self) -> StoreResult<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    pub fn list(&self) -> StoreResult<Vec<Movie>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM movies ORDER BY title COLLATE NOCASE"
        ))?;
        let movies = stmt
            .query_map([], row_to_movie)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(movies)
    }

    pub fn find_by_title(&self, title: &str) -> StoreResult<Option<Movie>> {
        let conn = self.conn()?;
        let movie = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM movies WHERE title = ?1 COLLATE NOCASE"),
                params![title],
                row_to_movie,
            )
            .optional()?;
        Ok(movie)
    }

    pub fn find_genre(&self, name: &str) -> StoreResult<Option<Genre>> {
        let conn = self.conn()?;
        let genre = conn
            .query_row(
                "SELECT genre_name, genre_description FROM movies
                 WHERE genre_name = ?1 COLLATE NOCASE LIMIT 1",
                params![name],
                |row| {
                    Ok(Genre {
                        name: row.get(0)?,
                        description: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(genre)
    }

    pub fn find_director(&self, name: &str) -> StoreResult<Option<Director>> {
        let conn = self.conn()?;
        let director = conn
            .query_row(
                "SELECT director_name, director_bio, director_birth, director_death FROM movies
                 WHERE director_name = ?1 COLLATE NOCASE LIMIT 1",
                params![name],
                |row| {
                    Ok(Director {
                        name: row.get(0)?,
                        bio: row.get(1)?,
                        birth: row.get(2)?,
                        death: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(director)
    }

    pub fn exists(&self, id: &Uuid) -> StoreResult<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM movies WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert(&self, movie: &Movie) -> StoreResult<()> {
        let actors = serde_json::to_string(&movie.actors)
            .map_err(|e| StoreError::Corrupt(format!("actors failed to encode: {e}")))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO movies (id, title, description, genre_name, genre_description,
                director_name, director_bio, director_birth, director_death,
                actors, image_path, featured)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                movie.id.to_string(),
                movie.title,
                movie.description,
                movie.genre.name,
                movie.genre.description,
                movie.director.name,
                movie.director.bio,
                movie.director.birth,
                movie.director.death,
                actors,
                movie.image_path,
                movie.featured as i64,
            ],
        )?;
        Ok(())
    }

    /// Insert the starter catalog when the movies table is empty. Returns
    /// the number of movies inserted.
    pub fn seed_if_empty(&self) -> StoreResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))?;
        drop(conn);

        if count > 0 {
            return Ok(0);
        }

        let catalog = starter_catalog();
        for movie in &catalog {
            self.insert(movie)?;
        }
        info!("Seeded {} movies into empty catalog", catalog.len());
        Ok(catalog.len())
    }
}

const COLUMNS: &str = "id, title, description, genre_name, genre_description, \
     director_name, director_bio, director_birth, director_death, \
     actors, image_path, featured";

fn row_to_movie(row: &rusqlite::Row<'_>) -> rusqlite::Result<Movie> {
    let id: String = row.get(0)?;
    let actors_json: String = row.get(9)?;
    let actors: Vec<String> = serde_json::from_str(&actors_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let featured: i64 = row.get(11)?;

    Ok(Movie {
        id: Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        title: row.get(1)?,
        description: row.get(2)?,
        genre: Genre {
            name: row.get(3)?,
            description: row.get(4)?,
        },
        director: Director {
            name: row.get(5)?,
            bio: row.get(6)?,
            birth: row.get(7)?,
            death: row.get(8)?,
        },
        actors,
        image_path: row.get(10)?,
        featured: featured != 0,
    })
}

/// A handful of well-known movies so a fresh install has something to serve.
fn starter_catalog() -> Vec<Movie> {
    fn movie(
        title: &str,
        description: &str,
        genre: (&str, &str),
        director: (&str, &str, Option<&str>, Option<&str>),
        actors: &[&str],
        featured: bool,
    ) -> Movie {
        Movie {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            genre: Genre {
                name: genre.0.to_string(),
                description: genre.1.to_string(),
            },
            director: Director {
                name: director.0.to_string(),
                bio: director.1.to_string(),
                birth: director.2.map(str::to_string),
                death: director.3.map(str::to_string),
            },
            actors: actors.iter().map(|a| a.to_string()).collect(),
            image_path: None,
            featured,
        }
    }

    let drama = (
        "Drama",
        "Character-driven stories built around emotional conflict.",
    );
    let crime = ("Crime", "Stories centered on crime and its consequences.");
    let scifi = (
        "Science Fiction",
        "Speculative, technology-driven stories.",
    );

    vec![
        movie(
            "The Shawshank Redemption",
            "Two imprisoned men bond over a number of years, finding solace and eventual redemption.",
            drama,
            (
                "Frank Darabont",
                "Hungarian-American director and screenwriter.",
                Some("1959-01-28"),
                None,
            ),
            &["Tim Robbins", "Morgan Freeman"],
            true,
        ),
        movie(
            "The Godfather",
            "The aging patriarch of an organized crime dynasty transfers control to his reluctant son.",
            crime,
            (
                "Francis Ford Coppola",
                "American director central to the New Hollywood era.",
                Some("1939-04-07"),
                None,
            ),
            &["Marlon Brando", "Al Pacino"],
            true,
        ),
        movie(
            "The Dark Knight",
            "Batman faces the Joker, a criminal mastermind bent on plunging Gotham into anarchy.",
            crime,
            (
                "Christopher Nolan",
                "British-American director known for large-scale, structurally inventive films.",
                Some("1970-07-30"),
                None,
            ),
            &["Christian Bale", "Heath Ledger"],
            true,
        ),
        movie(
            "Pulp Fiction",
            "The lives of two mob hitmen, a boxer, and a pair of diner bandits intertwine.",
            crime,
            (
                "Quentin Tarantino",
                "American director known for nonlinear storylines and ensemble casts.",
                Some("1963-03-27"),
                None,
            ),
            &["John Travolta", "Samuel L. Jackson", "Uma Thurman"],
            false,
        ),
        movie(
            "Inception",
            "A thief who steals corporate secrets through dream-sharing is given an inverse task.",
            scifi,
            (
                "Christopher Nolan",
                "British-American director known for large-scale, structurally inventive films.",
                Some("1970-07-30"),
                None,
            ),
            &["Leonardo DiCaprio", "Joseph Gordon-Levitt", "Elliot Page"],
            false,
        ),
    ]
}
