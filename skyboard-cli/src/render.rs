use std::fmt::Write as _;

use skyboard_core::{Lang, LoadState, LocalClockState, WeatherRecord};

struct Labels {
    local_time: &'static str,
    humidity: &'static str,
    wind: &'static str,
    popular: &'static str,
    loading: &'static str,
    no_cities: &'static str,
    no_suggestions: &'static str,
}

fn labels(lang: Lang) -> &'static Labels {
    const ES: Labels = Labels {
        local_time: "Hora local",
        humidity: "Humedad",
        wind: "Viento",
        popular: "Ciudades Populares",
        loading: "Cargando...",
        no_cities: "No hay ciudades disponibles",
        no_suggestions: "Sin sugerencias",
    };
    const EN: Labels = Labels {
        local_time: "Local time",
        humidity: "Humidity",
        wind: "Wind",
        popular: "Popular Cities",
        loading: "Loading...",
        no_cities: "No cities available",
        no_suggestions: "No suggestions",
    };

    match lang {
        Lang::Es => &ES,
        Lang::En => &EN,
    }
}

/// The searched-city card.
pub fn single(state: &LoadState<WeatherRecord>, times: &LocalClockState, lang: Lang) -> String {
    let l = labels(lang);
    match state {
        LoadState::Loading => format!("{}\n", l.loading),
        LoadState::Failed(msg) => format!("✖ {msg}\n"),
        // A single lookup either yields a record or fails.
        LoadState::Empty => String::new(),
        LoadState::Loaded(record) => card(record, times.get(&record.id).map(String::as_str), lang),
    }
}

pub fn card(record: &WeatherRecord, local_time: Option<&str>, lang: Lang) -> String {
    let l = labels(lang);
    let mut out = String::new();

    let _ = writeln!(out, "{}  {}, {}", record.icon_glyph(), record.name, record.country_code);
    let _ = writeln!(out, "{}°C  {}", record.temperature_celsius, record.condition_description);
    let _ = writeln!(
        out,
        "{}: {}   {}: {}%   {}: {} m/s",
        l.local_time,
        local_time.unwrap_or(l.loading),
        l.humidity,
        record.humidity_pct,
        l.wind,
        record.wind_speed_mps,
    );

    out
}

/// The popular-cities panel, one line per loaded city.
pub fn panel(state: &LoadState<Vec<WeatherRecord>>, times: &LocalClockState, lang: Lang) -> String {
    let l = labels(lang);
    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", l.popular);

    match state {
        LoadState::Loading => {
            let _ = writeln!(out, "{}", l.loading);
        }
        LoadState::Failed(msg) => {
            let _ = writeln!(out, "✖ {msg}");
        }
        LoadState::Empty => {
            let _ = writeln!(out, "{}", l.no_cities);
        }
        LoadState::Loaded(records) => {
            let name_width = records
                .iter()
                .map(|r| r.name.chars().count() + r.country_code.chars().count() + 2)
                .max()
                .unwrap_or(0);

            for record in records {
                let place = format!("{}, {}", record.name, record.country_code);
                let time = times.get(&record.id).map(String::as_str).unwrap_or(l.loading);
                let _ = writeln!(
                    out,
                    "{}  {:<name_width$}  {:>4}°C  {:<5}  {}",
                    record.icon_glyph(),
                    place,
                    record.temperature_celsius,
                    time,
                    record.condition_description,
                );
            }
        }
    }

    out
}

pub fn suggestions(hits: &[&str], lang: Lang) -> String {
    if hits.is_empty() {
        return format!("{}\n", labels(lang).no_suggestions);
    }

    hits.iter().fold(String::new(), |mut out, city| {
        let _ = writeln!(out, "{city}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, country: &str, temp: i32) -> WeatherRecord {
        WeatherRecord {
            id: id.to_string(),
            name: name.to_string(),
            country_code: country.to_string(),
            temperature_celsius: temp,
            condition_description: "cielo claro".to_string(),
            icon_id: "01n".to_string(),
            humidity_pct: 40,
            wind_speed_mps: 2.5,
            utc_offset_seconds: 0,
        }
    }

    #[test]
    fn card_shows_all_fields() {
        let out = card(&record("Madrid", "Madrid", "ES", 22), Some("14:05"), Lang::Es);

        assert!(out.contains("🌙  Madrid, ES"));
        assert!(out.contains("22°C  cielo claro"));
        assert!(out.contains("Hora local: 14:05"));
        assert!(out.contains("Humedad: 40%"));
        assert!(out.contains("Viento: 2.5 m/s"));
    }

    #[test]
    fn card_without_time_shows_placeholder() {
        let out = card(&record("Lima", "Lima", "PE", 18), None, Lang::En);
        assert!(out.contains("Local time: Loading..."));
    }

    #[test]
    fn panel_renders_each_state_distinctly() {
        let times = LocalClockState::new();

        let loading = panel(&LoadState::Loading, &times, Lang::Es);
        let empty = panel(&LoadState::Empty, &times, Lang::Es);
        let failed = panel(&LoadState::Failed("No se pudieron cargar los datos del clima".into()), &times, Lang::Es);

        assert!(loading.contains("Cargando..."));
        assert!(empty.contains("No hay ciudades disponibles"));
        assert!(failed.contains("✖ No se pudieron cargar los datos del clima"));
        assert_ne!(loading, empty);
        assert_ne!(empty, failed);
    }

    #[test]
    fn panel_lists_loaded_cities_with_times() {
        let mut times = LocalClockState::new();
        times.insert("Tokyo-JP".into(), "21:00".into());

        let state = LoadState::Loaded(vec![
            record("Tokyo-JP", "Tokyo", "JP", 9),
            record("Paris-FR", "Paris", "FR", -1),
        ]);
        let out = panel(&state, &times, Lang::En);

        assert!(out.contains("Popular Cities"));
        let tokyo = out.lines().find(|l| l.contains("Tokyo")).unwrap();
        assert!(tokyo.contains("9°C"));
        assert!(tokyo.contains("21:00"));
        let paris = out.lines().find(|l| l.contains("Paris")).unwrap();
        assert!(paris.contains("-1°C"));
        assert!(paris.contains("Loading..."));
    }

    #[test]
    fn single_card_uses_second_precision_time() {
        let state = LoadState::Loaded(record("Madrid", "Madrid", "ES", 22));
        let mut times = LocalClockState::new();
        times.insert("Madrid".into(), "14:05:09".into());

        let first = single(&state, &times, Lang::Es);
        assert!(first.contains("Hora local: 14:05:09"));

        times.insert("Madrid".into(), "14:05:10".into());
        let next = single(&state, &times, Lang::Es);
        assert_ne!(first, next);
    }

    #[test]
    fn single_failure_shows_message() {
        let out = single(&LoadState::Failed("boom".into()), &LocalClockState::new(), Lang::En);
        assert_eq!(out, "✖ boom\n");
    }

    #[test]
    fn suggestions_one_per_line() {
        assert_eq!(suggestions(&["Madrid", "Málaga"], Lang::Es), "Madrid\nMálaga\n");
        assert_eq!(suggestions(&[], Lang::En), "No suggestions\n");
    }
}
